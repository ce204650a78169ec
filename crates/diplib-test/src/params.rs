//! Regression test parameters and operations

use crate::error::TestError;
use diplib_core::Image;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Run the comparisons and print every checked value
    Generate,
    /// Compare with the expected values (default)
    #[default]
    Compare,
    /// Display mode - compare and also print intermediate results
    Display,
}

impl RegTestMode {
    /// Parse mode from environment variable or string
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "label")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Test mode (generate, compare, or display)
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters, configured from the
    /// `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, error: TestError) {
        let msg = format!("Failure in {}_reg: {}", self.test_name, error);
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        if self.mode == RegTestMode::Generate {
            eprintln!("  [{:02}] {}", self.index, actual);
        }
        let diff = (expected - actual).abs();
        // NaN never compares within delta
        if diff <= delta || (expected.is_nan() && actual.is_nan()) {
            true
        } else {
            self.fail(TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            });
            false
        }
    }

    /// Compare two byte strings (e.g. formatted tables) for equality
    pub fn compare_strings(&mut self, expected: &[u8], actual: &[u8]) -> bool {
        self.index += 1;

        if expected != actual {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}\n\
                 expected:\n{}\nactual:\n{}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len(),
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(actual)
            );
            eprintln!("{}", msg);
            self.failures.push(msg);
            self.success = false;
            false
        } else {
            true
        }
    }

    /// Compare two images: sizes, tensor elements and every sample value.
    /// Data types may differ.
    pub fn compare_images(&mut self, expected: &Image, actual: &Image) -> bool {
        self.index += 1;
        let same = expected.sizes() == actual.sizes()
            && expected.tensor_elements() == actual.tensor_elements()
            && expected.values_equal(actual).unwrap_or(false);
        if !same {
            self.fail(TestError::ImageMismatch { index: self.index });
        }
        same
    }

    /// Print an intermediate result in display mode.
    pub fn show(&self, label: &str, value: &dyn std::fmt::Display) {
        if self.display() {
            eprintln!("--- {} ---\n{}", label, value);
        }
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
