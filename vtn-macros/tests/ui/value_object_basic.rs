use vtn_macros::value_object;

#[value_object]
struct IntervalPeriod {
    start: String,
    duration: Option<String>,
}

#[value_object(debug = false)]
struct Opaque(f32);

#[value_object]
enum PayloadKind {
    #[default]
    Price,
    Simple,
}

fn main() {
    let _ = format!("{:?}", IntervalPeriod::default());
    let a = IntervalPeriod {
        start: "2024-01-01T00:00:00Z".into(),
        duration: None,
    };
    let _eq = a == a.clone();

    let _ = Opaque(1.5);
    let _kind: PayloadKind = Default::default();
}
