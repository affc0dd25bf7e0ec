use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PhotocardError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PhotocardError::device("x")
            .to_string()
            .contains("device error:")
    );
    assert!(
        PhotocardError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        PhotocardError::export("x")
            .to_string()
            .contains("export error:")
    );
    assert!(
        PhotocardError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PhotocardError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
