/// One live numeric property: a labeled `&mut f32` with its display range
/// and slider step. Writes through the reference take effect immediately;
/// there is no apply or commit step.
pub struct Tunable<'a> {
    pub label: &'a str,
    pub value: &'a mut f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl<'a> Tunable<'a> {
    pub fn new(label: &'a str, value: &'a mut f32, min: f32, max: f32, step: f32) -> Self {
        Self {
            label,
            value,
            min,
            max,
            step,
        }
    }
}

/// A named group of tunables; the panel renders one section per group.
pub struct TunableGroup<'a> {
    pub name: &'a str,
    pub tunables: Vec<Tunable<'a>>,
}

/// The settable-property contract between application state and the panel.
///
/// Implementors decide which scalar properties to expose and under what
/// labels; the panel knows nothing beyond what this returns.
pub trait TunableSource {
    fn tunables(&mut self) -> Vec<TunableGroup<'_>>;
}
