use wayfind_core::{
    build_graph, BuildOptions, Building, Floor, GeoPoint, Intersection, Landmark, LandmarkKind,
    Layer, NodeId, Road, SpatialModel, TransitionKind,
};

fn p(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

fn road(id: &str, one_way: bool, points: &[(f64, f64)]) -> Road {
    Road {
        id: id.into(),
        name: id.into(),
        points: points.iter().map(|&(lat, lon)| p(lat, lon)).collect(),
        one_way,
    }
}

fn elevator(id: &str, name: &str, at: (f64, f64), connected: &[&str]) -> Landmark {
    Landmark {
        id: id.into(),
        name: name.into(),
        position: p(at.0, at.1),
        kind: LandmarkKind::Vertical {
            kind: TransitionKind::Elevator,
            connected_floors: connected.iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn two_floor_building() -> SpatialModel {
    SpatialModel {
        version: 1,
        outdoor: Layer::default(),
        buildings: vec![Building {
            id: "b1".into(),
            name: "Science".into(),
            floors: vec![
                Floor {
                    id: "f1".into(),
                    level: 0,
                    layer: Layer {
                        roads: vec![road("r1", false, &[(0.0, 0.0), (0.0, 0.001)])],
                        landmarks: vec![elevator("e1", "Lift A", (0.0, 0.001), &["f2"])],
                        intersections: vec![],
                    },
                },
                Floor {
                    id: "f2".into(),
                    level: 1,
                    layer: Layer {
                        roads: vec![road("r2", false, &[(0.0, 0.001), (0.0, 0.002)])],
                        landmarks: vec![elevator("e2", "Lift A", (0.0, 0.001), &["f1"])],
                        intersections: vec![],
                    },
                },
            ],
        }],
    }
}

#[test]
fn non_one_way_roads_have_equal_weight_reverse_edges() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer {
            intersections: vec![],
            roads: vec![road("curvy", false, &[(0.0, 0.0), (0.0002, 0.001), (0.0, 0.002)])],
            landmarks: vec![],
        },
        buildings: vec![],
    };
    let g = build_graph(&model, &BuildOptions::default());

    for (idx, _) in g.nodes() {
        for edge in g.edges_from(idx) {
            let reverse = g
                .edges_from(edge.to)
                .iter()
                .find(|r| r.to == idx)
                .expect("missing reverse edge for bidirectional road");
            assert!((reverse.weight_m - edge.weight_m).abs() < 1e-9);
        }
    }
}

#[test]
fn rebuild_is_idempotent() {
    let model = two_floor_building();
    let a = build_graph(&model, &BuildOptions::default());
    let b = build_graph(&model, &BuildOptions::default());
    assert_eq!(a.node_count(), b.node_count());
    assert_eq!(a.edge_count(), b.edge_count());
    for (_, node) in a.nodes() {
        assert!(b.index_of(&node.id).is_some(), "missing node {}", node.id);
    }
}

#[test]
fn elevator_instances_are_joined_by_penalty_weighted_transition() {
    let options = BuildOptions::default();
    let g = build_graph(&two_floor_building(), &options);

    let e1 = g.index_of(&NodeId::from("b1/f1/lm/e1")).unwrap();
    let transition = g
        .edges_from(e1)
        .iter()
        .find(|e| e.is_vertical())
        .expect("elevator has no vertical edge");
    assert_eq!(transition.vertical, Some(TransitionKind::Elevator));
    assert_eq!(transition.weight_m, options.vertical_transition_penalty_m);
    assert_eq!(g.node(transition.to).id, NodeId::from("b1/f2/lm/e2"));

    // The pair is joined once, not once per floor listing
    let verticals: usize = g
        .nodes()
        .map(|(idx, _)| g.edges_from(idx).iter().filter(|e| e.is_vertical()).count())
        .sum();
    assert_eq!(verticals, 2); // one directed edge each way
}

#[test]
fn elevators_are_linked_to_their_floor_road() {
    let g = build_graph(&two_floor_building(), &BuildOptions::default());
    let e1 = g.index_of(&NodeId::from("b1/f1/lm/e1")).unwrap();
    let horizontal = g.edges_from(e1).iter().filter(|e| !e.is_vertical()).count();
    assert!(horizontal >= 1, "elevator anchor should reach its floor's road");
}

#[test]
fn landmark_within_radius_connects_with_distance_weight() {
    // ~22 m north of the road start, inside the default 50 m radius
    let model = SpatialModel {
        version: 1,
        outdoor: Layer {
            intersections: vec![],
            roads: vec![road("r", false, &[(0.0, 0.0), (0.0, 0.001)])],
            landmarks: vec![Landmark {
                id: "cafe".into(),
                name: "Cafe".into(),
                position: p(0.0002, 0.0),
                kind: LandmarkKind::PointOfInterest,
            }],
        },
        buildings: vec![],
    };
    let g = build_graph(&model, &BuildOptions::default());
    let lm = g.index_of(&NodeId::from("outdoor/lm/cafe")).unwrap();
    assert_eq!(g.out_degree(lm), 1);
    let link = &g.edges_from(lm)[0];
    assert!((link.weight_m - 22.2).abs() < 0.5, "got {}", link.weight_m);
}

#[test]
fn landmark_beyond_radius_stays_isolated() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer {
            intersections: vec![],
            roads: vec![road("r", false, &[(0.0, 0.0), (0.0, 0.001)])],
            landmarks: vec![Landmark {
                id: "far".into(),
                name: "Far Shed".into(),
                position: p(0.01, 0.0),
                kind: LandmarkKind::PointOfInterest,
            }],
        },
        buildings: vec![],
    };
    let g = build_graph(&model, &BuildOptions::default());
    let lm = g.index_of(&NodeId::from("outdoor/lm/far")).unwrap();
    assert_eq!(g.out_degree(lm), 0);
    assert_eq!(g.in_degrees()[lm], 0);
}

#[test]
fn intersections_shared_between_roads_merge_the_network() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer {
            intersections: vec![Intersection { id: "x".into(), position: p(0.0, 0.001) }],
            roads: vec![
                road("west", false, &[(0.0, 0.0), (0.0, 0.001)]),
                road("east", false, &[(0.0, 0.001), (0.0, 0.002)]),
            ],
            landmarks: vec![],
        },
        buildings: vec![],
    };
    let g = build_graph(&model, &BuildOptions::default());
    // x plus two outer waypoints; both roads meet at the shared intersection
    assert_eq!(g.node_count(), 3);
    let x = g.index_of(&NodeId::from("outdoor/ix/x")).unwrap();
    assert_eq!(g.out_degree(x), 2);
}
