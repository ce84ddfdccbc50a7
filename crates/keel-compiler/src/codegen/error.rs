/// Internal invariant violations during emission.
///
/// These indicate a bug in the pipeline or a malformed input the front end
/// should have rejected, never a user-facing compile error. No bytes are
/// returned when one occurs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("label L{0} is already bound")]
    LabelRedefined(u32),

    #[error("label L{0} is referenced but never bound")]
    UnboundLabel(u32),

    #[error("relocatable R{0} is already defined")]
    RelocatableRedefined(u32),

    #[error("relocatable R{0} is referenced but never defined")]
    UnboundRelocatable(u32),

    #[error("value {value} does not fit in {width} bytes")]
    ValueOutOfRange { value: u64, width: u8 },

    #[error("image exceeds {max} bytes")]
    ImageTooLarge { max: u64 },

    #[error("{0} reachable entities exceed the descriptor table limit")]
    TooManyDescriptors(usize),

    #[error("{0} selectors exceed the dispatch table limit")]
    TooManySelectors(usize),

    #[error("selector index {index} is outside a table of {count}")]
    SelectorOutOfRange { index: usize, count: usize },

    #[error("selector `{0}` is not in the selector table")]
    UnknownSelector(String),

    #[error("entity `{0}` is referenced but was not found reachable")]
    UnreachableEntity(String),

    #[error("method `{0}` is referenced but was not found reachable")]
    UnreachableMethod(String),

    #[error("`{entity}` has no callable method `{method}`")]
    MissingCallTarget { entity: String, method: String },

    #[error("no analysis results for `{0}`")]
    MissingAnalysis(String),

    #[error("`{entity}` has no field `{field}`")]
    UnknownField { entity: String, field: String },

    #[error("expected an entity type, found `{0}`")]
    ExpectedEntityType(String),

    #[error("`{0}` still has unbound type parameters")]
    OpenType(String),

    #[error("`{method}` needs {count} registers")]
    TooManyRegisters { method: String, count: usize },

    #[error("`{method}` passes {count} arguments in one call")]
    TooManyArguments { method: String, count: usize },

    #[error("local {local} is outside the {frame}-register frame of `{method}`")]
    RegisterOutOfRange {
        method: String,
        local: u32,
        frame: usize,
    },

    #[error("string of {0} bytes is too long to encode")]
    StringTooLong(usize),

    #[error("`{method}` has no block {block}")]
    InvalidBlock { method: String, block: u32 },
}
