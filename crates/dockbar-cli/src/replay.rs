//! Scenario replay: drives a `ButtonManager` from a recorded step list.

use anyhow::{Context, Result};
use dockbar_core::config::Config;
use dockbar_core::{BarUpdate, ButtonManager, ButtonSnapshot, Scenario, Step, WindowButton};
use std::path::Path;
use tracing::{debug, info};

/// Load `path` and run every step, printing the bar after each one.
pub fn run(path: &Path, config: &Config, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario: Scenario = serde_json::from_str(&content)
        .with_context(|| format!("Invalid scenario {}", path.display()))?;
    info!(
        "Replaying {} steps from {}",
        scenario.steps.len(),
        path.display()
    );

    let (mut bar, mut updates) = ButtonManager::new(config.taskbar);

    for (n, step) in scenario.steps.iter().enumerate() {
        apply_step(&mut bar, step, config).with_context(|| format!("Step {n} failed"))?;

        let mut sent = Vec::new();
        while let Ok(update) = updates.try_recv() {
            sent.push(update);
        }
        debug!("Step {n} produced {} updates", sent.len());

        if json {
            for update in &sent {
                println!("{}", serde_json::to_string(update)?);
            }
        } else {
            print_step(n, step, &sent, &bar.snapshot());
        }
    }
    Ok(())
}

fn apply_step(bar: &mut ButtonManager, step: &Step, config: &Config) -> Result<()> {
    match step {
        Step::HardRefresh {
            pinned_apps,
            windows,
        } => {
            let pins = pinned_apps
                .as_deref()
                .unwrap_or(config.pinned_apps.as_slice());
            bar.begin_hard_refresh(pins)?;
            for window in windows {
                bar.add(WindowButton::from(window))?;
            }
            bar.end_update()?;
        }
        Step::Update { windows } => {
            bar.begin_update()?;
            for window in windows {
                bar.add(WindowButton::from(window))?;
            }
            bar.end_update()?;
        }
        Step::SetAppId { handle, app_id } => bar.set_app_id(*handle, app_id.clone())?,
        Step::SetIndices {
            id,
            group_index,
            window_index,
        } => bar.set_indices(*id, *group_index, *window_index)?,
        Step::ForceReorder => bar.force_reorder()?,
    }
    Ok(())
}

fn step_name(step: &Step) -> &'static str {
    match step {
        Step::HardRefresh { .. } => "hard_refresh",
        Step::Update { .. } => "update",
        Step::SetAppId { .. } => "set_app_id",
        Step::SetIndices { .. } => "set_indices",
        Step::ForceReorder => "force_reorder",
    }
}

fn print_step(n: usize, step: &Step, sent: &[BarUpdate], buttons: &[ButtonSnapshot]) {
    let resets = sent
        .iter()
        .filter(|u| matches!(u, BarUpdate::Reset { .. }))
        .count();
    println!(
        "[{n}] {} ({} updates, {resets} resets)",
        step_name(step),
        sent.len()
    );

    for update in sent {
        if let BarUpdate::ButtonChanged { id, property } = update {
            println!("    ~ {id} {property:?}");
        }
    }

    if buttons.is_empty() {
        println!("    (empty bar)");
    }
    for button in buttons {
        let status = button
            .status
            .map(|s| format!(" {s:?}"))
            .unwrap_or_default();
        println!(
            "    {:>6} {:<16} {:<28} {}{status}",
            button.index,
            button.id.to_string(),
            button.group,
            button.title
        );
    }
}
