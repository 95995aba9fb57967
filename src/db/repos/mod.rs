pub mod feature_usage;
