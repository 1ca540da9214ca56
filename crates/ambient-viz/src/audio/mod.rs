mod capture;

pub use capture::CaptureRouter;
