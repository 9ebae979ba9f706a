use wayfind_core::{
    build_graph, validate, BuildOptions, Building, Floor, GeoPoint, Intersection, IssueCategory,
    Landmark, LandmarkKind, Layer, NodeId, Road, Severity, SpatialModel, TransitionKind,
};

fn p(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

fn road(id: &str, points: &[(f64, f64)]) -> Road {
    Road {
        id: id.into(),
        name: id.into(),
        points: points.iter().map(|&(lat, lon)| p(lat, lon)).collect(),
        one_way: false,
    }
}

fn vertical(id: &str, kind: TransitionKind, at: (f64, f64), connected: &[&str]) -> Landmark {
    Landmark {
        id: id.into(),
        name: id.into(),
        position: p(at.0, at.1),
        kind: LandmarkKind::Vertical {
            kind,
            connected_floors: connected.iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn floor(id: &str, level: i32, layer: Layer) -> Floor {
    Floor { id: id.into(), level, layer }
}

#[test]
fn removing_the_only_bridge_splits_the_network_in_two() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer {
            intersections: vec![
                Intersection { id: "x1".into(), position: p(0.0, 0.001) },
                Intersection { id: "x2".into(), position: p(0.0, 0.002) },
            ],
            roads: vec![
                road("west", &[(0.0, 0.0), (0.0, 0.001)]),
                road("bridge", &[(0.0, 0.001), (0.0, 0.002)]),
                road("east", &[(0.0, 0.002), (0.0, 0.003)]),
            ],
            landmarks: vec![],
        },
        buildings: vec![],
    };
    let mut g = build_graph(&model, &BuildOptions::default());

    let before = validate(&g, &model, &BuildOptions::default());
    assert_eq!(before.stats.connected_components, 1);

    let x1 = g.index_of(&NodeId::from("outdoor/ix/x1")).unwrap();
    let x2 = g.index_of(&NodeId::from("outdoor/ix/x2")).unwrap();
    assert_eq!(g.remove_edge(x1, x2), 1);
    assert_eq!(g.remove_edge(x2, x1), 1);

    let after = validate(&g, &model, &BuildOptions::default());
    assert_eq!(after.stats.connected_components, 2);
    let split_errors = after
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Error && i.category == IssueCategory::Connectivity)
        .count();
    assert_eq!(split_errors, 1, "only the smaller component is flagged");
}

#[test]
fn multi_floor_building_without_vertical_circulation_is_an_error() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer::default(),
        buildings: vec![Building {
            id: "b1".into(),
            name: "Annex".into(),
            floors: vec![
                floor("f1", 0, Layer { roads: vec![road("r1", &[(0.0, 0.0), (0.0, 0.001)])], ..Layer::default() }),
                floor("f2", 1, Layer { roads: vec![road("r2", &[(0.0, 0.0), (0.0, 0.001)])], ..Layer::default() }),
            ],
        }],
    };
    let g = build_graph(&model, &BuildOptions::default());
    let res = validate(&g, &model, &BuildOptions::default());
    assert!(res.issues.iter().any(|i| {
        i.severity == Severity::Error
            && i.category == IssueCategory::Accessibility
            && i.message.contains("no elevator or stairs")
    }));
}

#[test]
fn stairs_only_building_gets_elevator_warning_and_entrance_info() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer::default(),
        buildings: vec![Building {
            id: "b1".into(),
            name: "Walk-up".into(),
            floors: vec![
                floor(
                    "f1",
                    0,
                    Layer {
                        roads: vec![road("r1", &[(0.0, 0.0), (0.0, 0.001)])],
                        landmarks: vec![vertical("s1", TransitionKind::Stairs, (0.0, 0.001), &["f2"])],
                        ..Layer::default()
                    },
                ),
                floor(
                    "f2",
                    1,
                    Layer {
                        roads: vec![road("r2", &[(0.0, 0.001), (0.0, 0.002)])],
                        landmarks: vec![vertical("s2", TransitionKind::Stairs, (0.0, 0.001), &["f1"])],
                        ..Layer::default()
                    },
                ),
            ],
        }],
    };
    let g = build_graph(&model, &BuildOptions::default());
    let res = validate(&g, &model, &BuildOptions::default());

    assert!(res.issues.iter().any(|i| {
        i.severity == Severity::Warning
            && i.category == IssueCategory::Accessibility
            && i.message.contains("no elevator")
    }));
    assert!(res.issues.iter().any(|i| {
        i.severity == Severity::Info && i.message.contains("accessible entrance")
    }));
    assert_eq!(res.stats.stairs_count, 2);
    assert_eq!(res.stats.elevator_count, 0);
}

#[test]
fn accessible_entrance_suppresses_the_info_issue() {
    let model = SpatialModel {
        version: 1,
        outdoor: Layer::default(),
        buildings: vec![Building {
            id: "b1".into(),
            name: "Hall".into(),
            floors: vec![
                floor(
                    "f1",
                    0,
                    Layer {
                        roads: vec![road("r1", &[(0.0, 0.0), (0.0, 0.001)])],
                        landmarks: vec![
                            vertical("e1", TransitionKind::Elevator, (0.0, 0.001), &["f2"]),
                            Landmark {
                                id: "door".into(),
                                name: "Main Entrance".into(),
                                position: p(0.0, 0.0),
                                kind: LandmarkKind::Entrance { accessible: true },
                            },
                        ],
                        ..Layer::default()
                    },
                ),
                floor(
                    "f2",
                    1,
                    Layer {
                        roads: vec![road("r2", &[(0.0, 0.001), (0.0, 0.002)])],
                        landmarks: vec![vertical("e2", TransitionKind::Elevator, (0.0, 0.001), &["f1"])],
                        ..Layer::default()
                    },
                ),
            ],
        }],
    };
    let g = build_graph(&model, &BuildOptions::default());
    let res = validate(&g, &model, &BuildOptions::default());

    assert!(!res.issues.iter().any(|i| i.message.contains("accessible entrance")));
    assert_eq!(res.stats.accessible_entrance_count, 1);
    assert_eq!(res.stats.elevator_count, 2);
    assert_eq!(res.stats.vertical_circulation_count, 2);
    assert!(res.stats.indoor_road_length_m > 200.0);
    assert_eq!(res.stats.outdoor_road_length_m, 0.0);
}

#[test]
fn stats_are_computed_even_for_an_empty_model() {
    let model = SpatialModel::default();
    let g = build_graph(&model, &BuildOptions::default());
    let res = validate(&g, &model, &BuildOptions::default());
    assert!(res.issues.is_empty());
    assert_eq!(res.stats.node_count, 0);
    assert_eq!(res.stats.connected_components, 0);
}
