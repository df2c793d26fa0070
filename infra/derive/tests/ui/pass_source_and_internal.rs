use provis_derive::provis_error;
use std::borrow::Cow;

#[provis_error]
pub enum StoreError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<(), StoreError> {
    let io: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
    io.context("Opening snapshot")?;
    Ok(())
}

fn main() {
    let err = open().unwrap_err();
    assert_eq!(err.attached_context(), Some("Opening snapshot"));

    let internal: StoreError = "broken invariant".into();
    assert!(internal.attached_context().is_none());
}
