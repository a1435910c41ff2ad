//! Built-in native crash scenario for the React Native test app

use std::time::Duration;

use crate::core::Locator;
use crate::scenario::{Scenario, Step};

/// Text of the home screen entry that opens the list screen. The entry has
/// an empty text attribute.
pub const LIST_SCREEN_TEXT: &str = "";

/// Text of the button that triggers a native crash
pub const CRASH_TRIGGER_TEXT: &str = "Native Crash";

impl Scenario {
    /// Open the list screen, trigger a native crash, relaunch the app so the
    /// pending crash report is sent, then wait `flush_wait` for delivery.
    pub fn native_crash(flush_wait: Duration) -> Self {
        Self::new(
            "nativecrash_react_native_android",
            vec![
                Step::tap("open list screen", Locator::text_view(LIST_SCREEN_TEXT)),
                Step::tap("trigger native crash", Locator::text_view(CRASH_TRIGGER_TEXT)),
                // The report is only sent on the next launch
                Step::relaunch("relaunch app"),
                Step::wait("wait for crash report delivery", flush_wait),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Action;

    #[test]
    fn test_native_crash_steps() {
        let scenario = Scenario::native_crash(Duration::from_secs(5));
        assert_eq!(scenario.steps.len(), 4);

        assert_eq!(
            scenario.steps[0].action,
            Action::Tap(Locator::xpath(r#"//android.widget.TextView[@text=""]"#))
        );
        assert_eq!(
            scenario.steps[1].action,
            Action::Tap(Locator::xpath(
                r#"//android.widget.TextView[@text="Native Crash"]"#
            ))
        );
        assert_eq!(scenario.steps[2].action, Action::RelaunchApp);
        assert_eq!(
            scenario.steps[3].action,
            Action::Wait(Duration::from_secs(5))
        );
    }
}
