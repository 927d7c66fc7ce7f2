pub mod epoch_stats;
pub mod loop_fn;
pub mod train_stats;
pub mod trainer;
pub mod trainer_options;

pub use epoch_stats::EpochStats;
pub use loop_fn::train_loop;
pub use train_stats::TrainStats;
pub use trainer::Trainer;
pub use trainer_options::TrainerOptions;
