use casey_core::{
    EntryPath, ResultSummary, Step, StepMarker, TargetChoice, TestStatus, WizardViewModel,
};

/// Plain-text frame for the current view. Colour is applied by the caller.
pub fn render(view: &WizardViewModel) -> Vec<String> {
    let Some(step) = view.step else {
        return vec![
            "Casey AI test pipeline".to_string(),
            "Type 'generate' to build tests from a source, or 'direct' to run an existing test-case file."
                .to_string(),
        ];
    };

    let mut lines = vec![step_bar(view), String::new()];
    match step {
        Step::ChooseInput => render_input(view, &mut lines),
        Step::ReviewTests => render_review(view, &mut lines),
        Step::ConfigureTarget => render_target(view, &mut lines),
        Step::Results => render_results(view, &mut lines),
    }
    lines
}

pub fn step_bar(view: &WizardViewModel) -> String {
    let mut bar = String::new();
    for (i, (step, marker)) in Step::ALL.iter().zip(&view.markers).enumerate() {
        if i > 0 {
            let done = view.connectors.get(i - 1).copied().unwrap_or(false);
            bar.push_str(if done { " == " } else { " -- " });
        }
        let mark = match marker {
            StepMarker::Completed => "[x]",
            StepMarker::Active => "[>]",
            StepMarker::Pending => "[ ]",
        };
        bar.push_str(&format!("{mark} {} {}", step.number(), step.title()));
    }
    bar
}

/// Status line shown while generation runs.
pub fn progress_line(view: &WizardViewModel) -> Option<String> {
    view.progress
        .map(|p| format!("Progress: {:>3}% {}", p.percent, p.status_text()))
}

fn render_input(view: &WizardViewModel, lines: &mut Vec<String>) {
    match view.source {
        Some(source) => lines.push(format!("Source: {source}")),
        None => lines.push("Source: none selected (figma, document, manual, website)".to_string()),
    }
    lines.extend(progress_line(view));
}

fn render_review(view: &WizardViewModel, lines: &mut Vec<String>) {
    let mut heading = format!("Generated {} test cases", view.generated.len());
    if view.demo_data {
        heading.push_str(" (demo data)");
    }
    lines.push(heading);
    lines.push(format!(
        "Selected {} of {}",
        view.selected_count,
        view.generated.len()
    ));
    for row in &view.generated {
        let mark = if row.selected { "[*]" } else { "[ ]" };
        lines.push(format!(
            "{mark} #{} {} [{}] {}",
            row.id, row.name, row.kind, row.priority
        ));
        if !row.description.is_empty() {
            lines.push(format!("      {}", row.description));
        }
        if let Some(selector) = &row.selector {
            lines.push(format!("      selector: {selector}"));
        }
    }
}

fn render_target(view: &WizardViewModel, lines: &mut Vec<String>) {
    if view.entry == Some(EntryPath::DirectTesting) {
        match &view.upload {
            Some(upload) => lines.push(format!(
                "Uploaded: {} ({} test cases)",
                upload.file_name, upload.test_count
            )),
            None => lines.push("No test case file uploaded yet.".to_string()),
        }
    }
    lines.push(format!("Selected tests: {}", view.selected_count));
    match view.target.choice {
        TargetChoice::UseSourceUrl => lines.push(format!(
            "Target: source URL ({})",
            view.target.resolved.as_deref().unwrap_or("-")
        )),
        TargetChoice::DifferentUrl if view.target.url_input.trim().is_empty() => {
            lines.push("Target: (enter a URL with 'target <url>')".to_string())
        }
        TargetChoice::DifferentUrl => lines.push(format!("Target: {}", view.target.url_input)),
    }
    let live = if view.live_testing { "on" } else { "off" };
    lines.push(format!("Live testing: {live}"));
}

fn render_results(view: &WizardViewModel, lines: &mut Vec<String>) {
    if let Some(summary) = &view.summary {
        lines.push(summary_line(summary));
    }
    for row in &view.results {
        let mut line = format!(
            "{:<7} {} ({:.1}s)",
            row.status.label(),
            row.name,
            row.duration_ms as f64 / 1000.0
        );
        if row.status != TestStatus::Passed && !row.message.is_empty() {
            line.push_str(&format!(" - {}", row.message));
        }
        lines.push(line);
    }
}

pub fn summary_line(summary: &ResultSummary) -> String {
    format!(
        "Total {} | Passed {} | Failed {} | Success {}% | Duration {}s",
        summary.total,
        summary.passed,
        summary.failed,
        summary.success_rate,
        summary.duration_secs
    )
}
