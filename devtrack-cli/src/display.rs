//! Terminal rendering of requests, dashboards and reports.

use anyhow::Result;
use colored::{ColoredString, Colorize};

use devtrack_core::mis::{section_name, BudgetLine, MonthlyReport, VarianceState};
use devtrack_core::stats::{self, percentage};
use devtrack_core::{
    classify, format_size, phases, DevelopmentRequest, ItemPhase, ItemStatus, MonthKey,
    PhaseStatus, Priority, Severity, Stage, TrackedItemStore,
};

pub fn priority_colored(priority: Priority) -> ColoredString {
    match priority {
        Priority::Urgent => "Urgent".red().bold(),
        Priority::High => "High".red(),
        Priority::Medium => "Medium".yellow(),
        Priority::Low => "Low".green(),
    }
}

pub fn stage_colored(stage: Stage) -> ColoredString {
    match stage {
        Stage::Completed => stage.label().green(),
        Stage::Deployment => stage.label().cyan(),
        Stage::RequirementGathering | Stage::Analysis | Stage::Approval => stage.label().yellow(),
        _ => stage.label().blue(),
    }
}

fn severity_colored(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "Critical".red().bold(),
        Severity::High => "High".red(),
        Severity::Medium => "Medium".yellow(),
        Severity::Low => "Low".green(),
    }
}

fn item_status_colored(status: ItemStatus) -> ColoredString {
    match status {
        ItemStatus::Open => "Open".red(),
        ItemStatus::InProgress => "In Progress".yellow(),
        ItemStatus::Resolved => "Resolved".green(),
        ItemStatus::Closed => "Closed".dimmed(),
    }
}

fn phase_marker(status: PhaseStatus) -> ColoredString {
    match status {
        PhaseStatus::Completed => "✓".green(),
        PhaseStatus::Current => "●".blue().bold(),
        PhaseStatus::Pending => "○".dimmed(),
    }
}

/// Cuts `s` to at most `width` characters, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn bar(pct: u32) -> String {
    let filled = (pct as usize / 5).min(20);
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}

pub fn print_request_table(requests: &[DevelopmentRequest]) {
    if requests.is_empty() {
        println!("{}", "No requests found.".yellow());
        return;
    }

    println!(
        "{:<8} | {:<36} | {:<16} | {:<16} | {:<8} | {:<22} | {:<10}",
        "ID", "Title", "Requested By", "Department", "Priority", "Stage", "Date"
    );
    println!("{}", "-".repeat(136));

    for req in requests {
        println!(
            "{:<8} | {:<36} | {:<16} | {:<16} | {:<8} | {:<22} | {:<10}",
            req.id,
            truncate(&req.title, 36),
            truncate(&req.requested_by, 16),
            truncate(&req.department, 16),
            priority_colored(req.priority),
            stage_colored(req.current_stage),
            req.request_date
        );
    }
}

pub fn print_dashboard(requests: &[DevelopmentRequest]) {
    let overview = stats::overview(requests);

    println!("{}", "IT Development Tracker".blue().bold());
    println!();
    println!("{}: {}", "Total Requests".cyan(), overview.total);
    println!("{}: {}", "Completed".cyan(), overview.completed.to_string().green());
    println!("{}: {}", "In Progress".cyan(), overview.in_progress.to_string().yellow());

    println!("\n{}", "Stage Distribution".blue().bold());
    for (stage, count) in &overview.stages {
        let pct = percentage(*count, overview.total);
        println!(
            "  {:<22} {} {:>3} ({:>3}%)",
            stage.label(),
            bar(pct).blue(),
            count,
            pct
        );
    }

    println!("\n{}", "Priority Distribution".blue().bold());
    for (priority, count) in &overview.priorities {
        let pct = percentage(*count, overview.total);
        println!(
            "  {:<22} {:>3} ({:>3}%)",
            priority_colored(*priority),
            count,
            pct
        );
    }

    println!("\n{}", "Recent Requests".blue().bold());
    if overview.recent.is_empty() {
        println!("  {}", "No requests yet.".dimmed());
    }
    for req in &overview.recent {
        println!(
            "  {} {} - {} [{}]",
            req.id.yellow(),
            req.title,
            stage_colored(req.current_stage),
            priority_colored(req.priority)
        );
    }
}

fn field<T: std::fmt::Display>(label: &str, value: &Option<T>) {
    if let Some(v) = value {
        println!("  {}: {}", label.cyan(), v);
    }
}

fn yes_no(value: &Option<bool>) -> Option<&'static str> {
    value.map(|b| if b { "Yes" } else { "No" })
}

pub fn print_request(req: &DevelopmentRequest, items: &TrackedItemStore) {
    println!("{}: {}", "ID".blue(), req.id);
    println!("{}: {}", "Title".blue(), req.title);
    println!("{}: {}", "Requested By".blue(), req.requested_by);
    println!("{}: {}", "Department".blue(), req.department);
    println!("{}: {}", "Priority".blue(), priority_colored(req.priority));
    println!("{}: {}", "Request Date".blue(), req.request_date);
    println!("{}: {}", "Related Module".blue(), req.related_module);
    println!("{}: {}", "Current Stage".blue(), stage_colored(req.current_stage));
    println!("{}: {}", "Business Justification".blue(), req.business_justification);

    println!("\n{}:", "Timeline".green());
    for &stage in phases() {
        let status = classify(stage, req.current_stage);
        let date = req
            .stage_date(stage)
            .map(|d| d.to_string())
            .unwrap_or_default();
        println!(
            "  {} {:<22} {:<10} {}",
            phase_marker(status),
            stage.timeline_label(),
            status.to_string(),
            date.dimmed()
        );
    }

    let a = &req.analysis;
    let p = &req.approval;
    let d = &req.development;
    let t = &req.testing;
    let u = &req.uat;
    let dep = &req.deployment;
    let c = &req.closure;

    println!("\n{}:", "Phase Details".green());
    field("Requirement Description", &a.requirement_description);
    field("Feasibility", &a.feasibility_status);
    field("Estimated Effort (days)", &a.estimated_effort);
    field("Assigned Analyst", &a.assigned_analyst);
    field("Impacted Systems", &a.impacted_systems);
    field("Dependencies", &a.dependencies);
    field("Approval Status", &p.approval_status);
    field("Approved Date", &p.approved_date);
    field("Approver Comments", &p.approver_comments);
    field("Budget Allocation", &p.budget_allocation);
    field("Assigned Developer", &d.assigned_developer);
    field("Start Date", &d.start_date);
    field("Target Completion", &d.target_completion_date);
    field("Development Notes", &d.development_notes);
    field("Test Case Reference", &t.test_case_reference);
    field("Test Start Date", &t.test_start_date);
    field("Test Completion Date", &t.test_completion_date);
    field("Test Status", &t.test_status);
    field("Bugs Reported", &t.bugs_reported);
    field("Rework Needed", &yes_no(&t.rework_needed));
    field("UAT Status", &u.uat_status);
    field("UAT Completion Date", &u.uat_completion_date);
    field("UAT Feedback", &u.uat_feedback);
    field("Deployment Date", &dep.deployment_date);
    field("Deployed By", &dep.deployed_by);
    field("Deployment Type", &dep.deployment_type);
    field("Environment", &dep.environment);
    field("Rollback Plan", &yes_no(&dep.rollback_plan));
    field("Outcome", &c.outcome);
    field("Issues", &c.issues);
    field("Lessons Learned", &c.lessons_learned);
    field("Close Date", &c.close_date);
    field("Final Status", &c.final_status);

    print_tracked_items(&req.id, items);
}

pub fn print_tracked_items(request_id: &str, items: &TrackedItemStore) {
    println!(
        "\n{} ({} open):",
        "Tracked Items".green(),
        items.open_count(request_id)
    );
    let mut any = false;
    for phase in ItemPhase::ALL {
        let bucket = items.list(request_id, phase);
        if bucket.is_empty() {
            continue;
        }
        any = true;
        println!("  {} {}:", phase.label().magenta(), phase.item_noun());
        for item in bucket {
            println!(
                "    {} [{}] {} - {} / {} (assigned: {}, reported by {} on {})",
                item.id.dimmed(),
                item.item_type,
                item.title,
                severity_colored(item.severity),
                item_status_colored(item.status),
                item.assigned_to,
                item.reported_by,
                item.reported_date
            );
            for doc in &item.documents {
                println!(
                    "      {} {} ({}, {})",
                    "📎".dimmed(),
                    doc.name,
                    format_size(doc.size),
                    doc.uploaded_by
                );
            }
        }
    }
    if !any {
        println!("  {}", "None".dimmed());
    }
}

pub fn print_mis(requests: &[DevelopmentRequest], month: MonthKey) {
    let summary = stats::monthly_stats(requests, month);
    let monthly = stats::monthly_filter(requests, month);

    println!("{} {}", "MIS Summary:".blue().bold(), month.label());
    println!();
    println!("{}: {}", "Requests".cyan(), summary.total);
    println!(
        "{}: {} ({}%)",
        "Completed".cyan(),
        summary.completed,
        summary.completion_rate
    );
    println!(
        "{}: {} ({}%)",
        "Approved".cyan(),
        summary.approved,
        summary.approval_rate
    );
    println!("{}: {}", "In Development".cyan(), summary.in_development);
    println!("{}: {}", "In Testing / UAT".cyan(), summary.in_testing);
    println!(
        "{}: {} ({}%)",
        "Deployed".cyan(),
        summary.deployed,
        summary.deployment_rate
    );
    println!("{}: {}", "Pending".cyan(), summary.pending);

    println!("\n{}", "Departments".blue().bold());
    let departments = stats::department_breakdown(&monthly);
    if departments.is_empty() {
        println!("  {}", "No requests this month.".dimmed());
    }
    for (department, count) in departments {
        println!(
            "  {:<22} {:>3} ({:>3}%)",
            department,
            count,
            percentage(count, summary.total)
        );
    }

    println!("\n{}", "Phase Activity".blue().bold());
    let activity = stats::phase_activity(requests, month);
    if activity.is_empty() {
        println!("  {}", "No phase activity this month.".dimmed());
    }
    for entry in activity {
        println!(
            "  {} {} ({})",
            entry.request_id.yellow(),
            entry.title,
            entry.department.dimmed()
        );
        for row in entry.activities {
            println!(
                "    {} {} {:<16} {}",
                phase_marker(row.status),
                row.date,
                row.phase.timeline_label(),
                row.action
            );
        }
    }
}

fn budget_line(label: &str, line: &BudgetLine) {
    let state = match line.variance_state() {
        VarianceState::UnderBudget => line.variance_state().label().green(),
        VarianceState::OnBudget => line.variance_state().label().normal(),
        VarianceState::OverBudget => line.variance_state().label().red(),
    };
    println!(
        "  {:<6} budget {:>12.0}  actual {:>12.0}  variance {:>10.0}  ({:.1}% used, {})",
        label,
        line.budget,
        line.actual,
        line.variance,
        line.utilization(),
        state
    );
}

pub fn print_report(report: &MonthlyReport, month: MonthKey) {
    println!("{} {}", "Operational Report:".blue().bold(), month.label());

    let ops = &report.it_operations;
    println!("\n{}", "IT Operations".green());
    for (name, health) in ops.applications.iter().chain(ops.infrastructure.iter()) {
        println!("  {:<12} {:>6.1}%  {}", name, health.uptime, health.status);
    }
    println!(
        "  Tickets: {} total, {} resolved, {} pending, SLA {:.0}%",
        ops.tickets.total, ops.tickets.resolved, ops.tickets.pending, ops.tickets.sla_adherence
    );

    let sec = &report.cybersecurity;
    println!("\n{}", "Cybersecurity".green());
    println!(
        "  Incidents: {} total, {} resolved, {} pending",
        sec.incidents.total, sec.incidents.resolved, sec.incidents.pending
    );
    for (name, patch) in &sec.patches {
        println!("  Patches {:<10} {:>5.0}% ({} pending)", name, patch.completion, patch.pending);
    }
    println!(
        "  Backups: {} ok, {} failed ({:.0}%)",
        sec.backups.success, sec.backups.failure, sec.backups.success_rate
    );

    println!("\n{}", "Projects".green());
    println!(
        "  {} ongoing, {} new, {} delayed, {} completed",
        report.projects.ongoing.len(),
        report.projects.new_initiatives.len(),
        report.projects.delays.len(),
        report.projects.completed.len()
    );
    for project in &report.projects.ongoing {
        println!(
            "  {} {} [{}] {:.0}% ({})",
            project.id.yellow(),
            project.name,
            project.status,
            project.progress,
            project.department
        );
    }

    println!("\n{}", "System Usage".green());
    for (name, usage) in &report.system_usage.applications {
        println!(
            "  {:<12} {}/{} users ({:.1}%)",
            name, usage.active_users, usage.total_users, usage.usage
        );
    }
    for (name, license) in &report.system_usage.licenses {
        println!(
            "  {:<12} {}/{} licenses ({:.0}%), cost {:.0}",
            name, license.used, license.available, license.utilization, license.cost
        );
    }

    let savings = &report.automation.savings;
    println!("\n{}", "Automation".green());
    println!(
        "  {} processes, {:.0} hours saved, {:.0} cost saved",
        savings.processes, savings.total_time_saved, savings.cost_saved
    );

    let budget = &report.budget;
    println!("\n{}", "Budget".green());
    budget_line("OPEX", &budget.monthly.opex);
    budget_line("CAPEX", &budget.monthly.capex);
    println!(
        "  Forecast: next month {:.0}, next quarter {:.0}",
        budget.forecast.next_month, budget.forecast.next_quarter
    );

    println!("\n{}", "Risks & Roadmap".green());
    println!(
        "  {} major risks, {} dependencies, {} compliance items",
        report.risks.major_risks.len(),
        report.risks.dependencies.len(),
        report.risks.compliance.len()
    );
    println!(
        "  {} upgrades, {} maintenance windows, {} training programs, {} procurements planned",
        report.roadmap.upgrades.len(),
        report.roadmap.maintenance.len(),
        report.roadmap.training.len(),
        report.roadmap.procurement.len()
    );
}

pub fn print_report_section(report: &MonthlyReport, month: MonthKey, name: &str) -> Result<()> {
    let name = section_name(name)?;
    println!("{} {} / {}", "Operational Report:".blue().bold(), month.label(), name);
    print!("{}", report.section_yaml(name)?);
    Ok(())
}
