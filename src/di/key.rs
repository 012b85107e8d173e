use crate::injector::Injectable;
use crate::reflect::ClassRef;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Container key: a class, an opaque token or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Class(ClassRef),
    Token(TokenKey),
    Name(String),
}

impl Key {
    pub fn of<T: Injectable>() -> Self {
        Key::Class(ClassRef::of::<T>())
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Key::Class(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Class(class) => write!(f, "{class}"),
            Key::Token(token) => write!(f, "{token}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<ClassRef> for Key {
    fn from(class: ClassRef) -> Self {
        Key::Class(class)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<TokenKey> for Key {
    fn from(token: TokenKey) -> Self {
        Key::Token(token)
    }
}

impl<T> From<Token<T>> for Key {
    fn from(token: Token<T>) -> Self {
        Key::Token(token.key)
    }
}

impl<T> From<&Token<T>> for Key {
    fn from(token: &Token<T>) -> Self {
        Key::Token(token.key)
    }
}

/// Untyped identity of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenKey {
    id: Uuid,
    description: &'static str,
}

impl TokenKey {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.description)
    }
}

/// Opaque typed key. Every token is unique, even when two share a description.
///
/// ```
/// use tessera::di::{Container, Token};
///
/// let port: Token<u16> = Token::new("port");
/// let container = Container::new();
/// container.set_value(&port, 8080u16).unwrap();
/// assert_eq!(*container.get_token(&port).unwrap().unwrap(), 8080);
/// ```
pub struct Token<T> {
    key: TokenKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Token<T> {
    pub fn new(description: &'static str) -> Self {
        Self {
            key: TokenKey {
                id: Uuid::new_v4(),
                description,
            },
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        Key::Token(self.key)
    }
}

impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Token<T> {}

impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.key).finish()
    }
}
