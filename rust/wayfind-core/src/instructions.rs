//! Turn-by-turn instruction synthesis from a reconstructed route: bearing
//! deltas at each polyline vertex classified into maneuvers, straight runs
//! merged with accumulated distance.

use crate::geometry::{bearing_delta, haversine_distance, initial_bearing};
use crate::models::{GeoPoint, Maneuver, RouteInstruction, TransitionKind};

/// Bearing deltas under this are "continue straight".
pub const STRAIGHT_THRESHOLD_DEG: f64 = 20.0;

/// One traversed edge, flattened for instruction purposes. Horizontal
/// segments carry the edge geometry; vertical segments carry the transition
/// kind and destination floor instead.
#[derive(Clone, Debug)]
pub struct Segment {
    pub points: Vec<GeoPoint>,
    pub vertical: Option<TransitionKind>,
    pub to_floor: Option<String>,
    /// Position of the segment's source node. Anchors the instruction for
    /// vertical segments, whose `points` are empty.
    pub at: GeoPoint,
}

pub fn synthesize(segments: &[Segment]) -> Vec<RouteInstruction> {
    let mut out = Vec::new();
    let mut run: Vec<GeoPoint> = Vec::new();
    let mut departed = false;
    let mut last_pos: Option<GeoPoint> = None;

    for seg in segments {
        match seg.vertical {
            Some(kind) => {
                flush_run(&run, &mut departed, &mut out);
                // Anchor at the transition's own node, even when no
                // horizontal segment precedes it.
                let p = run.last().copied().unwrap_or(seg.at);
                out.push(vertical_instruction(kind, seg.to_floor.as_deref(), p));
                last_pos = Some(p);
                run.clear();
            }
            None => {
                for &p in &seg.points {
                    if run.last().map(|&l| l != p).unwrap_or(true) {
                        run.push(p);
                    }
                }
                if let Some(&p) = run.last() {
                    last_pos = Some(p);
                }
            }
        }
    }
    flush_run(&run, &mut departed, &mut out);

    if let Some(p) = run.last().copied().or(last_pos) {
        out.push(RouteInstruction {
            maneuver: Maneuver::Arrive,
            text: "You have arrived at your destination".to_string(),
            distance_m: 0.0,
            position: p,
        });
    }
    out
}

fn vertical_instruction(kind: TransitionKind, to_floor: Option<&str>, at: GeoPoint) -> RouteInstruction {
    let (maneuver, noun) = match kind {
        TransitionKind::Elevator => (Maneuver::UseElevator, "elevator"),
        TransitionKind::Stairs => (Maneuver::UseStairs, "stairs"),
    };
    let text = match to_floor {
        Some(f) => format!("Take the {noun} to floor {f}"),
        None => format!("Take the {noun}"),
    };
    RouteInstruction { maneuver, text, distance_m: 0.0, position: at }
}

fn flush_run(points: &[GeoPoint], departed: &mut bool, out: &mut Vec<RouteInstruction>) {
    if points.len() < 2 {
        return;
    }
    let mut maneuver = if *departed { Maneuver::Straight } else { Maneuver::Depart };
    *departed = true;
    let mut at = points[0];
    let mut acc = haversine_distance(points[0], points[1]);

    for i in 1..points.len() - 1 {
        let delta = bearing_delta(
            initial_bearing(points[i - 1], points[i]),
            initial_bearing(points[i], points[i + 1]),
        );
        let onward = haversine_distance(points[i], points[i + 1]);
        if delta.abs() < STRAIGHT_THRESHOLD_DEG {
            acc += onward;
        } else {
            out.push(make(maneuver, at, acc));
            maneuver = if delta < 0.0 { Maneuver::TurnLeft } else { Maneuver::TurnRight };
            at = points[i];
            acc = onward;
        }
    }
    out.push(make(maneuver, at, acc));
}

fn make(maneuver: Maneuver, at: GeoPoint, distance_m: f64) -> RouteInstruction {
    let text = match maneuver {
        Maneuver::Depart => format!("Head out and continue for {distance_m:.0} m"),
        Maneuver::Straight => format!("Continue straight for {distance_m:.0} m"),
        Maneuver::TurnLeft => format!("Turn left and continue for {distance_m:.0} m"),
        Maneuver::TurnRight => format!("Turn right and continue for {distance_m:.0} m"),
        Maneuver::UseElevator | Maneuver::UseStairs | Maneuver::Arrive => String::new(),
    };
    RouteInstruction { maneuver, text, distance_m, position: at }
}
