//! Help text rendering over the finalized group tree.

use herald_core::CommandFlags;

use crate::group::{CommandGroup, CommandSpec};
use crate::router::RouterConfig;

/// Renders the group tree as usage text. `admin` includes entries
/// flagged admin-only; hidden entries never render.
pub(crate) fn render(root: &CommandGroup, config: &RouterConfig, admin: bool) -> String {
    let mut out = String::new();
    render_group(&mut out, root, 0, config.help_underline, admin);
    out
}

fn render_group(out: &mut String, group: &CommandGroup, depth: usize, underline: bool, admin: bool) {
    if group.flags.contains(CommandFlags::HIDDEN) {
        return;
    }
    if !admin && group.flags.contains(CommandFlags::ADMIN_ONLY) {
        return;
    }

    let indent = "\t".repeat(depth);
    out.push_str(&indent);
    out.push_str("**");
    out.push_str(&group.name);
    out.push_str("**");
    if !group.description.is_empty() {
        out.push_str(": ");
        out.push_str(&group.description);
    }
    out.push('\n');

    for spec in group.commands() {
        if spec.is_plumb() || spec.flags.contains(CommandFlags::HIDDEN) {
            continue;
        }
        if !admin && spec.flags.contains(CommandFlags::ADMIN_ONLY) {
            continue;
        }
        out.push_str(&indent);
        out.push('\t');
        out.push_str(&render_command(spec, underline));
        out.push('\n');
    }

    for sub in group.subgroups() {
        render_group(out, sub, depth + 1, underline, admin);
    }
}

fn render_command(spec: &CommandSpec, underline: bool) -> String {
    let mut line = spec.name.clone();
    for arg in &spec.args {
        line.push(' ');
        if underline {
            line.push_str("__");
            line.push_str(&arg.usage);
            line.push_str("__");
        } else {
            line.push_str(&arg.usage);
        }
    }
    if spec.variadic {
        line.push_str(" ...");
    }
    if !spec.description.is_empty() {
        line.push_str(": ");
        line.push_str(&spec.description);
    }
    line
}
