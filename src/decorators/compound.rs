use super::{
    ClassDecorator, ClassExtractor, ClassPayload, Marker, Meta, MethodDecorator, MethodExtractor,
    MethodPayload, Mode, ParameterDecorator, ParameterExtractor, ParameterPayload,
    PropertyDecorator, PropertyExtractor, PropertyPayload, Shape, Target,
    create_class_decorator, create_method_decorator, create_parameter_decorator,
    create_property_decorator,
};
use crate::error::Result;
use std::sync::Arc;

/// Payload handed to a compound transformer, tagged with the target kind.
#[derive(Debug, Clone)]
pub enum CompoundPayload {
    Class(ClassPayload),
    Method(MethodPayload),
    Property(PropertyPayload),
    Parameter(ParameterPayload),
}

/// One decorator usable on classes, methods, properties and parameters.
pub struct CompoundDecorator<K: Mode, M: Meta, A> {
    class: ClassDecorator<K, M, A>,
    method: MethodDecorator<K, M, A>,
    property: PropertyDecorator<K, M, A>,
    parameter: ParameterDecorator<K, M, A>,
}

impl<K: Mode, M: Meta, A> Clone for CompoundDecorator<K, M, A> {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            method: self.method.clone(),
            property: self.property.clone(),
            parameter: self.parameter.clone(),
        }
    }
}

pub struct CompoundExtractors<K: Mode, M: Meta> {
    pub class: ClassExtractor<K, M>,
    pub method: MethodExtractor<K, M>,
    pub property: PropertyExtractor<K, M>,
    pub parameter: ParameterExtractor<K, M>,
}

impl<K: Mode, M: Meta> Clone for CompoundExtractors<K, M> {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            method: self.method.clone(),
            property: self.property.clone(),
            parameter: self.parameter.clone(),
        }
    }
}

impl<K: Mode, M: Meta, A> CompoundDecorator<K, M, A> {
    /// Record metadata on whatever `target` classifies as.
    pub fn apply(&self, target: Target, args: A) -> Result<()> {
        match target.shape()? {
            Shape::Class => self.class.apply(target.class, args),
            Shape::Method(method) => self.method.apply(target.class, method, args),
            Shape::Property(name) => self.property.apply(target.class, name, args),
            Shape::Parameter(method, index) => {
                self.parameter.apply(target.class, method, index, args)
            }
        }
        Ok(())
    }

    pub fn class(&self) -> &ClassDecorator<K, M, A> {
        &self.class
    }

    pub fn method(&self) -> &MethodDecorator<K, M, A> {
        &self.method
    }

    pub fn property(&self) -> &PropertyDecorator<K, M, A> {
        &self.property
    }

    pub fn parameter(&self) -> &ParameterDecorator<K, M, A> {
        &self.parameter
    }
}

pub fn create_decorator<K, M, A, F>(
    mode: K,
    transformer: F,
) -> (CompoundDecorator<K, M, A>, CompoundExtractors<K, M>)
where
    K: Mode + Copy,
    M: Meta,
    F: Fn(&CompoundPayload, A) -> M + Send + Sync + 'static,
{
    let transformer = Arc::new(transformer);

    let f = transformer.clone();
    let (class, class_extractor) = create_class_decorator(mode, move |p: &ClassPayload, a| {
        f(&CompoundPayload::Class(p.clone()), a)
    });
    let f = transformer.clone();
    let (method, method_extractor) = create_method_decorator(mode, move |p: &MethodPayload, a| {
        f(&CompoundPayload::Method(p.clone()), a)
    });
    let f = transformer.clone();
    let (property, property_extractor) =
        create_property_decorator(mode, move |p: &PropertyPayload, a| {
            f(&CompoundPayload::Property(p.clone()), a)
        });
    let f = transformer;
    let (parameter, parameter_extractor) =
        create_parameter_decorator(mode, move |p: &ParameterPayload, a| {
            f(&CompoundPayload::Parameter(p.clone()), a)
        });

    (
        CompoundDecorator {
            class,
            method,
            property,
            parameter,
        },
        CompoundExtractors {
            class: class_extractor,
            method: method_extractor,
            property: property_extractor,
            parameter: parameter_extractor,
        },
    )
}

pub fn create_marker<K: Mode + Copy>(
    mode: K,
) -> (CompoundDecorator<K, Marker, ()>, CompoundExtractors<K, Marker>) {
    create_decorator(mode, |_: &CompoundPayload, ()| Marker)
}
