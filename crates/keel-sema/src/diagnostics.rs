// diagnostics.rs
//
// Error sink for one compilation: records reported errors with their raw
// position and enforces the error ceiling.

use keel_identity::Pos;

use crate::errors::{FatalError, SemanticError};

/// A reported error wrapping a miette-enabled SemanticError.
#[derive(Debug, Clone)]
pub struct TypeError {
    pub error: SemanticError,
    pub pos: Pos,
}

impl TypeError {
    pub fn new(error: SemanticError, pos: Pos) -> Self {
        Self { error, pos }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<TypeError>,
    limit: usize,
    saturated: bool,
}

impl Diagnostics {
    pub fn new(limit: usize) -> Self {
        Self {
            errors: Vec::new(),
            limit,
            saturated: false,
        }
    }

    pub fn report(&mut self, error: SemanticError, pos: Pos) {
        tracing::debug!(%error, pos = pos.raw(), "semantic error");
        self.errors.push(TypeError::new(error, pos));
        if !self.saturated && self.limit != 0 && self.errors.len() >= self.limit {
            tracing::warn!(count = self.errors.len(), "error limit reached");
            self.saturated = true;
        }
    }

    /// `Err` once the error ceiling has been reached.
    pub fn check_limit(&self) -> Result<(), FatalError> {
        if self.saturated {
            return Err(FatalError::TooManyErrors {
                count: self.errors.len(),
            });
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn take(&mut self) -> Vec<TypeError> {
        self.saturated = false;
        std::mem::take(&mut self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_saturates() {
        let mut diags = Diagnostics::new(2);
        diags.report(SemanticError::DivisionByZero, Pos::new(1));
        assert_eq!(diags.check_limit(), Ok(()));
        diags.report(SemanticError::ConstantOverflow, Pos::new(2));
        assert_eq!(
            diags.check_limit(),
            Err(FatalError::TooManyErrors { count: 2 })
        );
        assert_eq!(diags.count(), 2);
        assert_eq!(diags.take().len(), 2);
        assert_eq!(diags.check_limit(), Ok(()));
    }

    #[test]
    fn zero_limit_never_saturates() {
        let mut diags = Diagnostics::new(0);
        for _ in 0..50 {
            diags.report(SemanticError::UntypedNil, Pos::NONE);
        }
        assert!(diags.check_limit().is_ok());
        assert!(diags.has_errors());
    }
}
