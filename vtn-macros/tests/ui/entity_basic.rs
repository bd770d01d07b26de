use vtn_domain::entity::{Entity, EntityKind, ObjectMetadata};
use vtn_domain::error::{StoreError, StoreResult};
use vtn_macros::{entity, value_object};

#[value_object]
struct Point {
    value: f64,
}

#[entity(kind = Event, validate = check_curve)]
struct Curve {
    #[search]
    event_name: Option<String>,
    #[search]
    tags: Vec<String>,
    points: Vec<Point>,
}

fn check_curve(curve: &Curve) -> StoreResult<()> {
    if curve.points.is_empty() {
        return Err(StoreError::validation("points required"));
    }
    Ok(())
}

#[entity(kind = Ven, debug = false)]
struct Silent {
    #[search]
    name: String,
}

impl std::fmt::Debug for Silent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Silent(..)")
    }
}

fn main() {
    assert_eq!(Curve::KIND, EntityKind::Event);

    let mut curve = Curve {
        metadata: ObjectMetadata::with_id("e-1"),
        event_name: Some("peak".into()),
        tags: vec!["summer".into()],
        points: Vec::new(),
    };
    assert!(curve.validate().is_err());
    curve.points.push(Point { value: 0.5 });
    assert!(curve.validate().is_ok());
    assert_eq!(curve.search_text(), vec!["peak", "summer"]);
    assert_eq!(curve.id().map(|id| id.as_str()), Some("e-1"));

    // 未指定 validate 时默认通过
    let silent = Silent::default();
    assert!(silent.validate().is_ok());
    let _ = format!("{silent:?}");
    let _copy = silent.clone();
}
