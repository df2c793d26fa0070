use provis_derive::provis_error;
use std::borrow::Cow;

#[provis_error]
pub enum LookupError {
    #[error("Missing entry{}: {key}", format_context(.context))]
    Missing { key: String, context: Option<Cow<'static, str>> },

    #[error("Closed")]
    Closed {},
}

fn find() -> Result<u8, LookupError> {
    Err(LookupError::Missing { key: "alpha".to_owned(), context: None })
}

fn main() {
    let err = find().context("Resolving alpha").unwrap_err();
    assert_eq!(err.attached_context(), Some("Resolving alpha"));
    assert_eq!(err.to_string(), "Missing entry (Resolving alpha): alpha");

    let closed: Result<u8, LookupError> = Err(LookupError::Closed {});
    assert!(closed.context("ignored").unwrap_err().attached_context().is_none());
}
