use vtn_macros::entity_id;

#[entity_id]
struct VenName(String);

fn main() {
    let name = VenName::new("ven-1");
    assert_eq!(name.to_string(), "ven-1");
    let inner: &String = name.as_ref();
    assert_eq!(inner, "ven-1");

    let parsed: VenName = "ven-1".parse().unwrap();
    assert_eq!(parsed, name);

    let raw: String = name.clone().into();
    assert_eq!(VenName::from(raw), name);

    assert_eq!(VenName::new("x").into_inner(), "x");

    let mut names = vec![VenName::new("b"), VenName::new("a")];
    names.sort();
    let _ = format!("{:?}", names);
}
