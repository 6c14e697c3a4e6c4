use std::path::Path;

#[test]
fn shipped_config_parses_and_validates() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../etc/vitals.toml");
    let text = std::fs::read_to_string(&path).unwrap();
    let cfg = vitals_config::load_toml(&text).unwrap();
    cfg.validate().unwrap();
    assert_eq!((cfg.pins.trigger, cfg.pins.echo), (23, 24));
    assert_eq!(cfg.height.samples, 30);
}
