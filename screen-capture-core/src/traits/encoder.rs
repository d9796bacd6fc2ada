use crate::capture::live_stream::StreamHandle;
use crate::models::error::CaptureError;
use crate::models::media::MediaFormat;
use crate::session::events::EncoderEvents;

/// External capture/encode service.
///
/// The encoder runs outside the controller's logical thread and reports
/// back only through `EncoderEvents`: `chunk`, then exactly one `stopped`
/// (or `failed`) after `stop()` is requested.
pub trait EncoderService: Send {
    fn is_format_supported(&self, format: &MediaFormat) -> bool;

    /// Container used when the requested format is unsupported.
    fn default_format(&self) -> MediaFormat;

    /// Begin encoding `stream` in `format`. Returns
    /// `CaptureError::EncoderUnsupported` if the format cannot be produced.
    fn start(
        &mut self,
        stream: StreamHandle,
        format: &MediaFormat,
        events: EncoderEvents,
    ) -> Result<Box<dyn EncoderHandle>, CaptureError>;
}

/// Control surface of one running encoder instance.
///
/// Dropping the handle tears the instance down.
pub trait EncoderHandle: Send {
    fn pause(&mut self);

    fn resume(&mut self);

    /// Request a stop. Buffered data is flushed as chunk events before the
    /// `stopped` event.
    fn stop(&mut self);
}
