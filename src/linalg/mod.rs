//! ==============================================================================================
//! =========================== Distributed Linear Algebra Primitives ============================
//! ==============================================================================================
//!
//! The minimum vocabulary the kernel needs, correct under row-partitioning: a process-group
//! transport for collectives (`process_group`), row-partitioned vector/matrix helpers built on
//! top of it (`distributed`), and a thin wrapper over a dense SVD kernel for small replicated
//! matrices (`dense`).

pub mod dense;
pub mod distributed;
pub mod process_group;

pub use dense::{small_matmul, small_svd};
pub use distributed::{axpby_local, inner_product, local_matvec};
pub use process_group::{ProcessGroup, SingleProcess, ThreadedProcessGroup};
