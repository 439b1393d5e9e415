// crates/trimpress-core/src/notice.rs
//
// Blocking notifications. The controller queues them; the UI shows the front
// one as a modal until the user dismisses it.

use crate::error::SessionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body:  String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.into(), body: body.into() }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, title: title.into(), body: body.into() }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: title.into(), body: body.into() }
    }
}

impl From<&SessionError> for Notice {
    fn from(err: &SessionError) -> Self {
        Notice::error(err.title(), err.to_string())
    }
}
