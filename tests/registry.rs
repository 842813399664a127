use mpm_core::core::{Node, NodeBase, Particle, ParticleBase};
use mpm_core::generators::{AsciiPointReader, PointReader};
use mpm_core::geometry::{Element, Hexahedron8, Quadrilateral4};
use mpm_core::loads::{LoadFunction, LoadProperties};
use mpm_core::materials::{LinearElastic, Material, MaterialProperties};
use mpm_core::math::Vector;
use mpm_core::registry::{EntityArgs, EntityStatusArgs, LoadArgs, MaterialArgs};
use mpm_core::{MpmError, Registry};

#[test]
fn particles_have_registered_concrete_type() {
    let registry = Registry::with_defaults();

    let p2d = registry
        .create::<dyn ParticleBase<2>, EntityArgs<2>>("P2D", (5, Vector::<2>::new(1.0, 2.0)))
        .unwrap();
    assert!(p2d.as_any().is::<Particle<2, 1>>());
    assert_eq!(p2d.id(), 5);
    assert_eq!(p2d.coordinates(), Vector::<2>::new(1.0, 2.0));
    assert_eq!(p2d.nphases(), 1);

    let p3d = registry
        .create::<dyn ParticleBase<3>, EntityStatusArgs<3>>(
            "P3D2PHASE",
            (0, Vector::<3>::zeros(), false),
        )
        .unwrap();
    assert!(p3d.as_any().is::<Particle<3, 2>>());
    assert!(!p3d.status());
}

#[test]
fn nodes_have_registered_concrete_type() {
    let registry = Registry::with_defaults();
    let node = registry
        .create::<dyn NodeBase<2>, EntityArgs<2>>("Node2D", (1, Vector::<2>::zeros()))
        .unwrap();
    assert!(node.as_any().is::<Node<2, 2, 1>>());

    let node = registry
        .create::<dyn NodeBase<3>, EntityArgs<3>>("Node3D2PHASE", (1, Vector::<3>::zeros()))
        .unwrap();
    assert!(node.as_any().is::<Node<3, 3, 2>>());
    assert_eq!(node.nphases(), 2);
}

#[test]
fn other_families_are_registered() {
    let registry = Registry::with_defaults();

    let element = registry.create::<dyn Element<2>, ()>("ED2Q4", ()).unwrap();
    assert_eq!(element.name(), Quadrilateral4.name());
    let element = registry.create::<dyn Element<3>, ()>("ED3H8", ()).unwrap();
    assert_eq!(element.nfunctions(), Hexahedron8.nfunctions());

    let material = registry
        .create::<dyn Material<3>, MaterialArgs>(
            "LinearElastic3D",
            (2, MaterialProperties::default()),
        )
        .unwrap();
    assert!(material.as_any().is::<LinearElastic<3>>());
    assert_eq!(material.id(), 2);

    let load = registry
        .create::<dyn LoadFunction, LoadArgs>("StepLoad", (0, LoadProperties::step(&[(0.0, 1.0)])))
        .unwrap();
    assert_eq!(load.value(1.0, 4.0), 4.0);

    let reader = registry.create::<dyn PointReader<2>, ()>("ReadAscii2D", ()).unwrap();
    let points = reader.read_points(&mut "0 1\n".as_bytes()).unwrap();
    assert_eq!(points.len(), 1);
}

#[test]
fn unregistered_keys_fail() {
    let registry = Registry::with_defaults();

    let err = registry
        .create::<dyn NodeBase<2>, EntityArgs<2>>("Node4D", (0, Vector::<2>::zeros()))
        .err()
        .unwrap();
    assert!(matches!(err, MpmError::UnknownType { ref key, .. } if key == "Node4D"));

    // Right key, wrong dimension.
    assert!(
        registry
            .create::<dyn NodeBase<3>, EntityArgs<3>>("Node2D", (0, Vector::<3>::zeros()))
            .is_err()
    );
    // Constructor errors propagate.
    assert!(
        registry
            .create::<dyn LoadFunction, LoadArgs>("StepLoad", (0, LoadProperties::default()))
            .is_err()
    );
}

#[test]
fn user_variants_can_be_added_and_overwrite() {
    let mut registry = Registry::with_defaults();
    registry.register::<dyn PointReader<2>, (), _>("ReadAscii2D", |()| {
        Ok(Box::new(AsciiPointReader::<2>::new()))
    });
    registry.register::<dyn NodeBase<2>, EntityArgs<2>, _>("Node2DFluid", |(id, x)| {
        Ok(Box::new(Node::<2, 2, 2>::new(id, x)))
    });

    assert_eq!(
        registry.keys::<dyn NodeBase<2>, EntityArgs<2>>(),
        vec!["Node2D", "Node2D2PHASE", "Node2DFluid"]
    );
    assert_eq!(registry.keys::<dyn PointReader<2>, ()>(), vec!["ReadAscii2D"]);

    let shared = registry.into_shared();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = shared.clone();
            std::thread::spawn(move || {
                registry
                    .create::<dyn NodeBase<2>, EntityArgs<2>>("Node2DFluid", (i, Vector::<2>::zeros()))
                    .map(|node| node.nphases())
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 2);
    }
}
