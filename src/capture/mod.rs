//! Image/question capture and submission

pub mod controller;
pub mod draft;
pub mod flow;
pub mod picker;

pub use controller::{AnsweredSubmission, CaptureController, CaptureServices, SubmitOutcome};
pub use draft::{CaptureDraft, ImageSource, PickedImage, Thumbnail};
pub use flow::{CaptureFlow, CaptureState, FlowSnapshot, SubmitTicket};
pub use picker::{FileDialogPicker, ImagePicker};
