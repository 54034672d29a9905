pub mod exam_focus;
pub mod storage;
pub mod uf;

pub use exam_focus::ExamFocus;
pub use uf::Uf;
