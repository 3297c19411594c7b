use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::DataStore;

pub fn run<S: DataStore>(store: &mut S) -> Result<CmdResult> {
    let report = store.doctor()?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
    } else {
        if report.removed_orphan_photos > 0 {
            result.add_message(CmdMessage::warning(format!(
                "Removed {} photo records without a pin",
                report.removed_orphan_photos
            )));
        }
        if report.removed_stray_images > 0 {
            result.add_message(CmdMessage::warning(format!(
                "Removed {} image files without a photo record",
                report.removed_stray_images
            )));
        }
    }

    Ok(result.with_report(report))
}
