//! # hanzi-srs-algo - 汉字词汇间隔重复调度核心
//!
//! Pure scheduling logic for drilling Chinese vocabulary, with no I/O:
//!
//! - **Priority & Memory Strength** - urgency and modeled recall probability
//! - **Level Transitions** - stochastic per-task level updates
//! - **Pool Composition** - when to introduce unseen items
//! - **Batch Selection** - which due items to drill next
//!
//! ## 模块结构
//!
//! - [`clock`] - injectable clock and uniform random source
//! - [`memory`] - priority (Δt / 2^level) and memory strength (2^(-C·P))
//! - [`transition`] - Bernoulli-chain level transitions
//! - [`task`] - per-task statistics and review history
//! - [`item`] - vocabulary item with its six directed tasks
//! - [`pool`] - known/new partitions and the introduction policy
//! - [`batch`] - due-item sampling
//! - [`scheduler`] - session facade over all of the above
//! - [`sanitize`] - integrity checks for restored state
//! - [`types`] - shared types and constants
//!
//! ## 使用示例
//!
//! ```rust
//! use chrono::Utc;
//! use hanzi_srs_algo::{seeded_rng, FixedClock, Outcome, Pool, Scheduler, TaskKind, TrainingParams, VocabRecord};
//!
//! let clock = FixedClock::new(Utc::now());
//! let mut scheduler = Scheduler::new(Pool::new(), TrainingParams::default(), clock, seeded_rng(Some(7)));
//! scheduler.ingest(VocabRecord {
//!     id: "1".into(),
//!     hanzi: "你好".into(),
//!     pinyin: "ni3 hao3".into(),
//!     translation: "hello".into(),
//!     context: None,
//! });
//!
//! let id = scheduler.maybe_introduce(true).unwrap();
//! let batch = scheduler.next_batch().unwrap();
//! assert_eq!(batch.ids(), &[id.clone()]);
//! scheduler.record_outcome(&id, TaskKind::ALL[0], Outcome::Correct).unwrap();
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod batch;
pub mod clock;
pub mod error;
pub mod item;
pub mod memory;
pub mod pool;
pub mod sanitize;
pub mod scheduler;
pub mod task;
pub mod transition;
pub mod types;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use batch::{select_due_batch, ReviewBatch};
pub use clock::{seeded_rng, Clock, FixedClock, ScriptedSource, SystemClock, UniformSource};
pub use error::SrsError;
pub use item::{Item, ItemStats, TaskSet, VocabRecord};
pub use memory::{memory_strength, priority};
pub use pool::{
    AnswerNormalizer, DeclineReason, GradationHistogram, IngestOutcome, IntroductionDecision,
    PlainNormalizer, Pool,
};
pub use scheduler::Scheduler;
pub use task::TaskStats;
pub use transition::next_level;
