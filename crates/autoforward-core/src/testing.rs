//! Testing helpers and mock utilities.
//!
//! Provides convenient constructors for mocked platform collaborators.

use crate::error::PlatformError;
use crate::platform::{HistoryStream, MockJobTransport, PostedMessage, SourceMessage};
use futures_util::StreamExt;

/// Build a source message in channel `a`.
#[must_use]
pub fn source_message(id: i32, caption: Option<&str>) -> SourceMessage {
    SourceMessage {
        chat: "a".to_string(),
        id,
        caption: caption.map(str::to_string),
    }
}

/// Turn a fixed list of messages into a history stream.
#[must_use]
pub fn history_of(messages: Vec<SourceMessage>) -> HistoryStream {
    futures_util::stream::iter(messages.into_iter().map(Ok::<_, PlatformError>)).boxed()
}

/// Create a mock transport that accepts every send and edit.
///
/// Every posted message gets id `1`.
#[must_use]
pub fn mock_transport_noop() -> MockJobTransport {
    let mut mock = MockJobTransport::new();
    mock.expect_send_reply()
        .returning(|_| Ok(PostedMessage(1)));
    mock.expect_edit_message().returning(|_, _| Ok(()));
    mock
}
