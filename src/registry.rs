//! Runtime object registry.
//!
//! Concrete particle, node, element, material, load and reader variants are
//! registered against an abstract base (`dyn Trait`) and a constructor
//! argument tuple. The pair (base, arguments) selects a [`Factory`]; the
//! string key selects the constructor inside it. The same key may therefore
//! live under several bases or signatures without colliding.
//!
//! The registry is filled once at startup by [`register_defaults`] (plus any
//! user registrations) and is read-only afterwards, so a shared
//! `Arc<Registry>` can serve concurrent `create` calls.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use bevy::log::warn;
use indexmap::IndexMap;

use crate::core::{Node, NodeBase, Particle, ParticleBase};
use crate::error::{MpmError, MpmResult};
use crate::generators::{AsciiPointReader, PointReader};
use crate::geometry::{Element, Hexahedron8, Quadrilateral4, Triangle3};
use crate::loads::{LoadFunction, LoadProperties, SineLoad, StepLoad};
use crate::materials::{LinearElastic, Material, MaterialProperties};
use crate::math::{Index, Vector};

type Constructor<B, A> = Box<dyn Fn(A) -> MpmResult<Box<B>> + Send + Sync>;

/// Constructors for one (base, argument signature) pair, keyed by name.
pub struct Factory<B: ?Sized, A> {
    constructors: IndexMap<String, Constructor<B, A>>,
}

impl<B: ?Sized, A> Factory<B, A> {
    fn new() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn create(&self, key: &str, args: A) -> MpmResult<Box<B>> {
        match self.constructors.get(key) {
            Some(constructor) => constructor(args),
            None => Err(MpmError::UnknownType {
                base: type_name::<B>(),
                key: key.to_owned(),
            }),
        }
    }
}

#[derive(Default)]
pub struct Registry {
    factories: HashMap<(TypeId, TypeId), Box<dyn Any + Send + Sync>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in variant.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_defaults(&mut registry);
        registry
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Associate `key` with a constructor for base `B` taking arguments `A`.
    ///
    /// An existing entry under the same (base, signature, key) is replaced
    /// and a warning is logged.
    pub fn register<B, A, F>(&mut self, key: &str, constructor: F)
    where
        B: ?Sized + 'static,
        A: 'static,
        F: Fn(A) -> MpmResult<Box<B>> + Send + Sync + 'static,
    {
        let factory = self
            .factories
            .entry((TypeId::of::<B>(), TypeId::of::<A>()))
            .or_insert_with(|| Box::new(Factory::<B, A>::new()));

        // The map key pins the concrete factory type.
        let Some(factory) = factory.downcast_mut::<Factory<B, A>>() else {
            return;
        };

        if factory
            .constructors
            .insert(key.to_owned(), Box::new(constructor))
            .is_some()
        {
            warn!(
                "registry: `{}` re-registered for {}; previous constructor replaced",
                key,
                type_name::<B>()
            );
        }
    }

    pub fn factory<B, A>(&self) -> Option<&Factory<B, A>>
    where
        B: ?Sized + 'static,
        A: 'static,
    {
        self.factories
            .get(&(TypeId::of::<B>(), TypeId::of::<A>()))
            .and_then(|factory| factory.downcast_ref::<Factory<B, A>>())
    }

    pub fn contains<B, A>(&self, key: &str) -> bool
    where
        B: ?Sized + 'static,
        A: 'static,
    {
        self.factory::<B, A>()
            .is_some_and(|factory| factory.contains(key))
    }

    /// Registered keys for (B, A) in registration order.
    pub fn keys<B, A>(&self) -> Vec<String>
    where
        B: ?Sized + 'static,
        A: 'static,
    {
        self.factory::<B, A>()
            .map(|factory| factory.keys().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn create<B, A>(&self, key: &str, args: A) -> MpmResult<Box<B>>
    where
        B: ?Sized + 'static,
        A: 'static,
    {
        match self.factory::<B, A>() {
            Some(factory) => factory.create(key, args),
            None => Err(MpmError::UnknownType {
                base: type_name::<B>(),
                key: key.to_owned(),
            }),
        }
    }
}

/// Constructor arguments for particles and nodes.
pub type EntityArgs<const D: usize> = (Index, Vector<D>);
/// Particle constructor arguments including the initial status.
pub type EntityStatusArgs<const D: usize> = (Index, Vector<D>, bool);
pub type MaterialArgs = (usize, MaterialProperties);
pub type LoadArgs = (usize, LoadProperties);

fn register_particle<const D: usize, const NPHASES: usize>(registry: &mut Registry, key: &str) {
    registry.register::<dyn ParticleBase<D>, EntityArgs<D>, _>(key, |(id, coordinates)| {
        Ok(Box::new(Particle::<D, NPHASES>::new(id, coordinates)))
    });
    registry.register::<dyn ParticleBase<D>, EntityStatusArgs<D>, _>(
        key,
        |(id, coordinates, status)| {
            Ok(Box::new(Particle::<D, NPHASES>::with_status(
                id,
                coordinates,
                status,
            )))
        },
    );
}

fn register_node<const D: usize, const DOF: usize, const NPHASES: usize>(
    registry: &mut Registry,
    key: &str,
) {
    registry.register::<dyn NodeBase<D>, EntityArgs<D>, _>(key, |(id, coordinates)| {
        Ok(Box::new(Node::<D, DOF, NPHASES>::new(id, coordinates)))
    });
}

fn register_material<const D: usize>(registry: &mut Registry, key: &str) {
    registry.register::<dyn Material<D>, MaterialArgs, _>(key, |(id, properties)| {
        Ok(Box::new(LinearElastic::<D>::new(id, &properties)?))
    });
}

fn register_reader<const D: usize>(registry: &mut Registry, key: &str) {
    registry.register::<dyn PointReader<D>, (), _>(key, |()| {
        Ok(Box::new(AsciiPointReader::<D>::new()))
    });
}

/// Startup routine enumerating every built-in concrete type.
pub fn register_defaults(registry: &mut Registry) {
    register_particle::<2, 1>(registry, "P2D");
    register_particle::<2, 2>(registry, "P2D2PHASE");
    register_particle::<3, 1>(registry, "P3D");
    register_particle::<3, 2>(registry, "P3D2PHASE");

    register_node::<2, 2, 1>(registry, "Node2D");
    register_node::<3, 3, 1>(registry, "Node3D");
    register_node::<2, 2, 2>(registry, "Node2D2PHASE");
    register_node::<3, 3, 2>(registry, "Node3D2PHASE");

    registry.register::<dyn Element<2>, (), _>("ED2Q4", |()| Ok(Box::new(Quadrilateral4)));
    registry.register::<dyn Element<2>, (), _>("ED2T3", |()| Ok(Box::new(Triangle3)));
    registry.register::<dyn Element<3>, (), _>("ED3H8", |()| Ok(Box::new(Hexahedron8)));

    register_material::<2>(registry, "LinearElastic2D");
    register_material::<3>(registry, "LinearElastic3D");

    registry.register::<dyn LoadFunction, LoadArgs, _>("StepLoad", |(id, properties)| {
        Ok(Box::new(StepLoad::new(id, properties.table)?))
    });
    registry.register::<dyn LoadFunction, LoadArgs, _>("SineLoad", |(id, properties)| {
        Ok(Box::new(SineLoad::new(
            id,
            properties.frequency,
            properties.phase_shift,
        )))
    });

    register_reader::<2>(registry, "ReadAscii2D");
    register_reader::<3>(registry, "ReadAscii3D");
}

/// Build an element for `key`, shared between the cells that use it.
pub fn create_element<const D: usize>(
    registry: &Registry,
    key: &str,
) -> MpmResult<Arc<dyn Element<D>>> {
    registry
        .create::<dyn Element<D>, ()>(key, ())
        .map(Arc::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> usize;
    }

    struct Square;
    struct Triangle;

    impl Shape for Square {
        fn sides(&self) -> usize {
            4
        }
    }

    impl Shape for Triangle {
        fn sides(&self) -> usize {
            3
        }
    }

    #[test]
    fn create_returns_registered_variant() {
        let mut registry = Registry::new();
        registry.register::<dyn Shape, (), _>("square", |()| Ok(Box::new(Square)));
        registry.register::<dyn Shape, (), _>("triangle", |()| Ok(Box::new(Triangle)));

        assert_eq!(registry.create::<dyn Shape, ()>("square", ()).unwrap().sides(), 4);
        assert_eq!(registry.create::<dyn Shape, ()>("triangle", ()).unwrap().sides(), 3);
        assert_eq!(registry.keys::<dyn Shape, ()>(), vec!["square", "triangle"]);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut registry = Registry::new();
        registry.register::<dyn Shape, (), _>("square", |()| Ok(Box::new(Square)));

        let err = registry.create::<dyn Shape, ()>("hexagon", ()).err().unwrap();
        assert!(matches!(err, MpmError::UnknownType { ref key, .. } if key == "hexagon"));
        assert!(err.is_fatal());
    }

    #[test]
    fn signatures_are_separate_namespaces() {
        let mut registry = Registry::new();
        registry.register::<dyn Shape, (), _>("shape", |()| Ok(Box::new(Square)));
        registry.register::<dyn Shape, (usize,), _>("shape", |(_,)| Ok(Box::new(Triangle)));

        assert_eq!(registry.create::<dyn Shape, ()>("shape", ()).unwrap().sides(), 4);
        assert_eq!(registry.create::<dyn Shape, (usize,)>("shape", (1,)).unwrap().sides(), 3);
        assert!(!registry.contains::<dyn Shape, (u8,)>("shape"));
    }

    #[test]
    fn reregistration_overwrites() {
        let mut registry = Registry::new();
        registry.register::<dyn Shape, (), _>("shape", |()| Ok(Box::new(Square)));
        registry.register::<dyn Shape, (), _>("shape", |()| Ok(Box::new(Triangle)));

        assert_eq!(registry.create::<dyn Shape, ()>("shape", ()).unwrap().sides(), 3);
        assert_eq!(registry.keys::<dyn Shape, ()>().len(), 1);
    }

    #[test]
    fn defaults_cover_every_family() {
        let registry = Registry::with_defaults();
        assert!(registry.contains::<dyn ParticleBase<2>, EntityArgs<2>>("P2D"));
        assert!(registry.contains::<dyn ParticleBase<3>, EntityStatusArgs<3>>("P3D2PHASE"));
        assert!(registry.contains::<dyn NodeBase<2>, EntityArgs<2>>("Node2D"));
        assert!(registry.contains::<dyn NodeBase<3>, EntityArgs<3>>("Node3D"));
        assert!(registry.contains::<dyn Element<2>, ()>("ED2Q4"));
        assert!(registry.contains::<dyn Element<3>, ()>("ED3H8"));
        assert!(registry.contains::<dyn Material<2>, MaterialArgs>("LinearElastic2D"));
        assert!(registry.contains::<dyn LoadFunction, LoadArgs>("StepLoad"));
        assert!(registry.contains::<dyn PointReader<3>, ()>("ReadAscii3D"));
        // Node2D is only registered under the 2D base.
        assert!(!registry.contains::<dyn NodeBase<3>, EntityArgs<3>>("Node2D"));
    }
}
