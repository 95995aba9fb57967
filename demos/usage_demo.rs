//! Console walkthrough of the feature usage ledger.
//!
//! Illustrative consumer only; in the desktop app this data feeds a panel
//! with progress bars and per-feature controls.

use usage_ledger::{AppError, LedgerConfig, RemainingUsage, UsageManager};

fn main() -> Result<(), AppError> {
    usage_ledger::logging::init();

    let manager = UsageManager::open(&LedgerConfig::default())?;

    println!("=== Premium Feature Usage Demo ===\n");

    initialize_sample_data(&manager)?;
    demonstrate_feature_usage(&manager)?;
    show_usage_statistics(&manager)?;

    println!("\n=== Demo Complete ===");
    Ok(())
}

fn initialize_sample_data(manager: &UsageManager) -> Result<(), AppError> {
    println!("Initializing sample premium feature data...\n");

    // Clear leftovers from previous runs so the walkthrough is repeatable.
    for feature in [
        "Advanced Reporting",
        "Bulk Import",
        "Data Export",
        "API Access",
        "Cloud Sync",
        "Premium Analytics",
    ] {
        manager.reset_feature_usage(feature)?;
    }

    record_multiple(manager, "Advanced Reporting", 50, 15)?;
    record_multiple(manager, "Bulk Import", 25, 8)?;
    record_multiple(manager, "Data Export", 100, 45)?;
    record_multiple(manager, "API Access", 0, 127)?; // unlimited
    record_multiple(manager, "Cloud Sync", 10, 10)?; // at limit
    record_multiple(manager, "Premium Analytics", 30, 5)?;

    println!("Sample data initialized!\n");
    Ok(())
}

fn record_multiple(
    manager: &UsageManager,
    feature: &str,
    limit: i64,
    times: usize,
) -> Result<(), AppError> {
    for i in 0..times {
        if !manager.record_usage(feature, limit)? {
            println!("  -> {feature}: limit reached at {} usages", i + 1);
            break;
        }
    }
    Ok(())
}

fn demonstrate_feature_usage(manager: &UsageManager) -> Result<(), AppError> {
    println!("=== Feature Usage Demonstration ===\n");

    println!("Attempting to use 'Cloud Sync' (already at limit):");
    report(manager.record_usage("Cloud Sync", 10)?);

    println!("Attempting to use 'Premium Analytics' (has capacity):");
    report(manager.record_usage("Premium Analytics", 30)?);

    println!("Attempting to use 'API Access' (unlimited):");
    report(manager.record_usage("API Access", 0)?);

    Ok(())
}

fn report(success: bool) {
    if success {
        println!("  Result: Success\n");
    } else {
        println!("  Result: Failed - Limit reached\n");
    }
}

fn show_usage_statistics(manager: &UsageManager) -> Result<(), AppError> {
    println!("=== Premium Feature Usage Statistics ===\n");

    let summary = manager.usage_summary()?;
    println!("Summary Statistics:");
    println!("  Total Features: {}", summary.total_features);
    println!("  Active Features: {}", summary.active_features);
    println!("  Total Usage Count: {}", summary.total_usage_count);
    println!("  Features at Limit: {}", summary.features_at_limit);
    println!(
        "  Most Used Feature: {}",
        summary.most_used_feature.as_deref().unwrap_or("None")
    );
    println!(
        "  Last Activity: {}\n",
        summary.last_activity.as_deref().unwrap_or("None")
    );

    println!("Detailed Feature Usage:");
    println!("{}", "-".repeat(80));
    println!(
        "{:<20} {:<10} {:<10} {:<12} {:<10}",
        "Feature Name", "Usage", "Limit", "Remaining", "Status"
    );
    println!("{}", "-".repeat(80));

    for feature in manager.get_all_feature_usage()? {
        let limit = if feature.usage_limit == 0 {
            "Unlimited".to_string()
        } else {
            feature.usage_limit.to_string()
        };
        let remaining = match feature.remaining_usage() {
            RemainingUsage::Unlimited => "Unlimited".to_string(),
            RemainingUsage::Remaining(n) => n.to_string(),
        };
        let status = if feature.is_limit_reached() {
            "AT LIMIT"
        } else {
            "Available"
        };
        println!(
            "{:<20} {:<10} {:<10} {:<12} {:<10}",
            feature.feature_name, feature.usage_count, limit, remaining, status
        );
    }

    println!("{}", "-".repeat(80));
    Ok(())
}
