use std::process::Command;

use anyhow::{Context, Result};

/// (package, features) pairs that must build
const FEATURE_COMBINATIONS: &[(&str, &[&str])] = &[
    ("pca-common", &[]),
    ("pca-common", &["platform"]),
    ("pca-common", &["test-utils"]),
    ("pca-common", &["platform", "test-utils"]),
    ("pca-infra", &[]),
    ("pca-infra", &["keychain"]),
];

/// Check that all required feature combinations compile successfully.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, (package, features)) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let label = if features.is_empty() {
            format!("{package} (default)")
        } else {
            format!("{package} [{joined}]")
        };

        println!(
            "\n[{}/{}] cargo check -p {package}{}",
            index + 1,
            FEATURE_COMBINATIONS.len(),
            if features.is_empty() { String::new() } else { format!(" --features {joined}") }
        );

        let mut command = Command::new("cargo");
        command.args(["check", "--all-targets", "-p", package]);
        if !features.is_empty() {
            command.arg("--features").arg(&joined);
        }

        let status =
            command.status().with_context(|| format!("Failed to run cargo check for {label}"))?;

        if !status.success() {
            anyhow::bail!("Feature combination {label} failed to compile");
        }

        println!("✅ {label} compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
