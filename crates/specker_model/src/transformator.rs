//! The transformator: owner of one model and composition point of passes.

use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::error::SpecResult;
use crate::manipulator::SpecModelManipulator;
use crate::model::SpecModel;
use crate::section::SpecSection;

/// A transformation applied to a model through the manipulator contract.
///
/// Passes locate sections with the manipulator queries, change structured
/// fields (which marks the sections dirty) and never touch `raw_text`.
pub trait TransformationPass {
    fn name(&self) -> &str;

    fn apply(&self, manipulator: &mut dyn SpecModelManipulator) -> SpecResult<()>;
}

/// Adapter that exclusively owns one [`SpecModel`].
///
/// Transformation passes talk to the model through the transformator, so
/// they depend on the manipulator interface rather than on the model itself.
/// The transformator performs no transformation of its own.
#[derive(Debug, Default)]
pub struct SpecModelTransformator {
    model: SpecModel,
    diagnostics: Diagnostics,
}

impl SpecModelTransformator {
    /// Wrap `model`, or a fresh empty model when `None`.
    pub fn new(model: Option<SpecModel>) -> Self {
        Self {
            model: model.unwrap_or_default(),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Replace the held model, returning the one released.
    pub fn set_model(&mut self, model: SpecModel) -> SpecModel {
        std::mem::replace(&mut self.model, model)
    }

    pub fn get_model(&self) -> &SpecModel {
        &self.model
    }

    pub fn get_model_mut(&mut self) -> &mut SpecModel {
        &mut self.model
    }

    pub fn into_model(self) -> SpecModel {
        self.model
    }

    pub fn get_sections(&self) -> &[SpecSection] {
        self.model.get_sections()
    }

    /// Run one pass over the held model.
    pub fn apply(&mut self, pass: &dyn TransformationPass) -> SpecResult<()> {
        let name = pass.name().to_string();
        self.diagnostics
            .emit(|| debug!(pass = %name, "Applying transformation pass"));

        let result = pass.apply(&mut *self);

        match &result {
            Ok(()) => {
                let dirty = self.model.get_sections().iter().filter(|s| s.is_dirty()).count();
                self.diagnostics
                    .emit(|| debug!(pass = %name, dirty, "Transformation pass finished"));
            }
            Err(e) => self
                .diagnostics
                .emit(|| warn!(pass = %name, "Transformation pass failed: {}", e)),
        }
        result
    }

    /// Run `passes` in order; the first failure stops the sequence.
    pub fn apply_all(&mut self, passes: &[&dyn TransformationPass]) -> SpecResult<()> {
        for pass in passes {
            self.apply(*pass)?;
        }
        Ok(())
    }
}

impl SpecModelManipulator for SpecModelTransformator {
    fn model(&self) -> &SpecModel {
        &self.model
    }

    fn model_mut(&mut self) -> &mut SpecModel {
        &mut self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpecError;
    use crate::reader::SpecFileReader;

    struct SetVersion(&'static str);

    impl TransformationPass for SetVersion {
        fn name(&self) -> &str {
            "set-version"
        }

        fn apply(&self, manipulator: &mut dyn SpecModelManipulator) -> SpecResult<()> {
            manipulator.set_tag_value("Version", self.0);
            Ok(())
        }
    }

    struct RemoveFirst;

    impl TransformationPass for RemoveFirst {
        fn name(&self) -> &str {
            "remove-first"
        }

        fn apply(&self, manipulator: &mut dyn SpecModelManipulator) -> SpecResult<()> {
            manipulator.remove_section(0).map(|_| ())
        }
    }

    #[test]
    fn test_new_without_model_is_usable() {
        let transformator = SpecModelTransformator::new(None);
        assert!(transformator.get_sections().is_empty());
        assert!(transformator.find_tag("Name").is_none());
    }

    #[test]
    fn test_set_model_releases_previous() {
        let first = SpecFileReader::new().read(b"Name: a\n").unwrap();
        let second = SpecFileReader::new().read(b"Name: b\n").unwrap();

        let mut transformator = SpecModelTransformator::new(Some(first));
        let released = transformator.set_model(second);

        assert_eq!(released.tag_value("Name"), Some("a"));
        assert_eq!(transformator.tag_value("Name"), Some("b"));
    }

    #[test]
    fn test_passes_compose_on_same_model() {
        let model = SpecFileReader::new()
            .read(b"Name: foo\nVersion: 1.0\n")
            .unwrap();
        let mut transformator = SpecModelTransformator::new(Some(model));

        transformator
            .apply_all(&[&SetVersion("1.1"), &SetVersion("1.2"), &RemoveFirst])
            .unwrap();

        assert_eq!(transformator.get_sections().len(), 1);
        assert_eq!(transformator.tag_value("Version"), Some("1.2"));
    }

    #[test]
    fn test_failing_pass_stops_sequence() {
        let mut transformator = SpecModelTransformator::new(None);
        let err = transformator
            .apply_all(&[&RemoveFirst, &SetVersion("9")])
            .unwrap_err();
        assert!(matches!(err, SpecError::IndexOutOfRange { index: 0, len: 0 }));
    }
}
