// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Assertions reported as JSON lines.
//!
//! [`lpm_assert!`](crate::lpm_assert) records the outcome of a check on the
//! console and, when it fails, terminates the partition with a `FAIL`
//! verdict instead of panicking.

use alloc::string::String;

use serde::Serialize;

#[derive(Serialize)]
struct AssertJson<'a, T>
where
    T: Serialize,
{
    #[serde(rename = "type")]
    type_: &'a str,
    level: &'a str,
    message: &'a str,
    line: String,
    assertion_result: bool,
    testname: &'a T,
}

/// Formats the outcome of an assertion as a JSON object.
#[doc(hidden)]
pub fn format_assert_json_string<T>(
    s: &str,
    terminate_new_line: bool,
    line: String,
    assert_result: bool,
    testname: &T,
) -> String
where
    T: Serialize,
{
    let level = if assert_result { "INFO" } else { "ERROR" };
    let assert_json = AssertJson {
        type_: "assert",
        level,
        message: s,
        line,
        assertion_result: assert_result,
        testname,
    };

    let mut out = serde_json::to_string(&assert_json).unwrap_or_default();
    if terminate_new_line {
        out.push('\n');
    }
    out
}

#[macro_export]
/// Asserts that a condition is true, logging the result in JSON format.
/// If the condition is false, the partition is terminated through the given
/// RTAS channel with a `FAIL` verdict.
macro_rules! lpm_assert {
    ($channel:expr, $condition:expr, $message:expr) => {{
        let file_line = format!("{}:{}", core::file!(), core::line!());
        let expn = stringify!($condition);
        let result: bool = $condition;
        let js = $crate::lpm_assert::format_assert_json_string(
            &expn, true, file_line, result, &$message,
        );
        $crate::lpm_logger::write_raw(&js);
        if !result {
            $crate::rtas::terminate($channel, $crate::rtas::TestStatus::Fail);
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtas::RtasChannel;
    use crate::test_helpers::FakeFirmware;
    use rtas_defs::RtasArgs;

    #[test]
    fn passing_assertion_is_logged() {
        let js = format_assert_json_string(
            "passes > 0",
            true,
            "src/runtime.rs:10".into(),
            true,
            &"migration",
        );
        assert!(js.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(js.trim_end()).unwrap();
        assert_eq!(value["type"], "assert");
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "passes > 0");
        assert_eq!(value["line"], "src/runtime.rs:10");
        assert_eq!(value["assertion_result"], true);
        assert_eq!(value["testname"], "migration");
    }

    #[test]
    fn failing_assertion_is_an_error() {
        let js = format_assert_json_string("false", false, String::new(), false, &1u32);
        assert!(!js.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&js).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["assertion_result"], false);
        assert_eq!(value["testname"], 1);
    }

    #[test]
    fn true_condition_does_not_terminate() {
        let mut args = RtasArgs::new();
        let mut rtas = RtasChannel::new(&mut args, FakeFirmware::at(0, 0, 0));
        crate::lpm_assert!(&mut rtas, 1 + 1 == 2, "arithmetic");
        assert!(rtas.entry().calls.is_empty());
        assert_eq!(rtas.entry().terminated, None);
    }
}
