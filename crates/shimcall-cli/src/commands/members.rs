//! `shimcall members`: list what the demo type exposes

use anyhow::Result;
use shimcall_reflect::{MemberDescriptor, Visibility};
use termcolor::ColorChoice;

use crate::demo::sample_type;
use crate::output::StyledOutput;

pub fn execute(choice: ColorChoice) -> Result<()> {
    let info = sample_type();
    let mut out = StyledOutput::new(choice);

    out.heading(&format!("{} ({} members)", info.name(), info.members().len()));
    for member in info.members() {
        out.label(&format!("  {:<16}", member.kind().to_string()));
        out.plain(&member.to_string());
        if let MemberDescriptor::Method(m) = member {
            if m.visibility() == Visibility::Private {
                out.dim("  (private)");
            }
            if m.has_by_ref_parameters() {
                out.dim("  (by-ref)");
            }
        }
        out.newline();
    }
    out.flush();
    Ok(())
}
