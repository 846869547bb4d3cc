//! A single grid cell

use cellgrid_core::{CellRange, CellType, UserData};
use cellgrid_formula::{
    evaluate, parse_cell_text, EvaluationContext, FormulaError, FormulaExpr, FormulaResult,
    FormulaValue, NoReferences,
};
use std::any::Any;

/// A cell: the text a user typed, its parsed form, and its last computed value
///
/// The raw text is the source of truth. Everything else is derived from it by
/// [`Cell::set_raw`] and by evaluation, which the owning [`crate::Grid`] drives.
#[derive(Debug, Default)]
pub struct Cell {
    raw: String,
    cell_type: CellType,
    /// `None` until text is first set; `Some(Err)` when the text does not lex/parse
    formula: Option<FormulaResult<FormulaExpr>>,
    references: Vec<CellRange>,
    /// Result of the last evaluation of `raw`; `None` while not established
    outcome: Option<FormulaResult<FormulaValue>>,
    computed: Option<String>,
    user_data: UserData,
}

impl Cell {
    /// Create an empty cell with no text
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell holding `text`
    pub fn with_raw(text: impl Into<String>) -> Self {
        let mut cell = Self::new();
        cell.set_raw(text);
        cell
    }

    /// Replace the cell's text, then lex, parse and classify it
    ///
    /// Formula problems never fail this call: they are kept on the cell and
    /// shown as an error marker. Text that reads no other cells is evaluated
    /// right away; anything else waits for the grid.
    pub fn set_raw(&mut self, text: impl Into<String>) {
        self.raw = text.into();
        self.invalidate();

        match parse_cell_text(&self.raw) {
            Ok(parsed) => {
                self.cell_type = parsed.cell_type;
                self.references = parsed.expr.references();
                if parsed.expr.is_self_contained() {
                    let result = evaluate(&parsed.expr, &NoReferences);
                    self.establish(result);
                }
                self.formula = Some(Ok(parsed.expr));
            }
            Err(e) => {
                self.cell_type = CellType::Unknown;
                self.references.clear();
                self.formula = Some(Err(e.clone()));
                self.establish(Err(e));
            }
        }
    }

    /// The text last given to [`Cell::set_raw`]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Display text of the last evaluation, or `None` if not yet evaluated
    ///
    /// Failed evaluations display as an error marker such as `#REF!`.
    pub fn computed(&self) -> Option<&str> {
        self.computed.as_deref()
    }

    /// Syntactic shape of the text
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// Value of the last successful evaluation
    pub fn value(&self) -> Option<&FormulaValue> {
        self.outcome.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// Error of the last evaluation, including lex and parse errors
    pub fn error(&self) -> Option<&FormulaError> {
        self.outcome.as_ref().and_then(|r| r.as_ref().err())
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Parsed expression, if the text lexed and parsed
    pub fn expression(&self) -> Option<&FormulaExpr> {
        self.formula.as_ref().and_then(|f| f.as_ref().ok())
    }

    /// Cells and ranges the expression reads
    pub fn references(&self) -> &[CellRange] {
        &self.references
    }

    /// Whether the computed value reflects the current text
    pub fn is_established(&self) -> bool {
        self.outcome.is_some()
    }

    // === User data ===

    /// Store caller-owned data, replacing anything stored before
    pub fn set_user_data<T: Any + Send + Sync>(&mut self, value: T) {
        self.user_data.set(value);
    }

    /// Borrow the stored data if it is a `T`
    pub fn user_data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.user_data.get::<T>()
    }

    /// Mutably borrow the stored data if it is a `T`
    pub fn user_data_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.user_data.get_mut::<T>()
    }

    pub fn has_user_data(&self) -> bool {
        self.user_data.is_set()
    }

    /// Remove and return the stored data if it is a `T`; other types stay put
    pub fn take_user_data<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.user_data.take::<T>()
    }

    pub fn clear_user_data(&mut self) {
        self.user_data.clear();
    }

    // === Grid-internal mutation ===

    /// Evaluate the current text against `ctx` without storing the result
    pub(crate) fn compute(&self, ctx: &dyn EvaluationContext) -> FormulaResult<FormulaValue> {
        match &self.formula {
            None => Ok(FormulaValue::Empty),
            Some(Err(e)) => Err(e.clone()),
            Some(Ok(expr)) => evaluate(expr, ctx),
        }
    }

    /// Record an evaluation result and its display text
    pub(crate) fn establish(&mut self, outcome: FormulaResult<FormulaValue>) {
        self.computed = Some(match &outcome {
            Ok(value) => value.as_string(),
            Err(e) => e.marker().to_string(),
        });
        self.outcome = Some(outcome);
    }

    /// Forget the computed value; the next read evaluates again
    pub(crate) fn invalidate(&mut self) {
        self.outcome = None;
        self.computed = None;
    }

    pub(crate) fn outcome(&self) -> Option<&FormulaResult<FormulaValue>> {
        self.outcome.as_ref()
    }

    /// Whether the text reads other cells
    pub(crate) fn has_references(&self) -> bool {
        !self.references.is_empty()
    }
}
