use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ConvertError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ConvertError::decode("x").to_string().contains("decode error:"));
    assert!(
        ConvertError::extraction("x")
            .to_string()
            .contains("extraction error:")
    );
    assert!(
        ConvertError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(ConvertError::merge("x").to_string().contains("merge error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ConvertError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn anyhow_context_converts_with_question_mark() {
    fn open_missing() -> ConvertResult<()> {
        use anyhow::Context as _;
        std::fs::read("definitely/not/here.gif").context("read source")?;
        Ok(())
    }

    let err = open_missing().unwrap_err();
    assert!(matches!(err, ConvertError::Other(_)));
    assert!(err.to_string().contains("read source"));
}
