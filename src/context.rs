use std::iter::Chain;

use evalexpr::{
    Context, ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprError,
    EvalexprResult, Function, IterateVariablesContext, Value,
};

/// Layers a mutable local context over a read-only fallback. Reads consult the
/// local context first, writes always land locally, so nothing escapes an
/// evaluation frame.
#[derive(Debug)]
pub struct LayeredContext<'a, A: ?Sized, B: ?Sized> {
    local: &'a mut A,
    fallback: &'a B,
}

impl<'a, A, B> LayeredContext<'a, A, B> {
    #[inline(always)]
    pub fn new(local: &'a mut A, fallback: &'a B) -> Self {
        Self { local, fallback }
    }
}

pub trait LayerableContext<B>
where
    B: Context,
{
    fn layered_over<'a>(&'a mut self, fallback: &'a B) -> LayeredContext<'a, Self, B>;
}

impl<A, B> LayerableContext<B> for A
where
    A: Context,
    B: Context,
{
    #[inline(always)]
    fn layered_over<'a>(&'a mut self, fallback: &'a B) -> LayeredContext<'a, Self, B> {
        LayeredContext::new(self, fallback)
    }
}

impl<'a, A, B> Context for LayeredContext<'a, A, B>
where
    A: Context,
    B: Context,
{
    fn get_value(&self, identifier: &str) -> Option<&Value> {
        self.local
            .get_value(identifier)
            .or_else(|| self.fallback.get_value(identifier))
    }

    fn call_function(&self, identifier: &str, argument: &Value) -> EvalexprResult<Value> {
        match self.local.call_function(identifier, argument) {
            Err(EvalexprError::FunctionIdentifierNotFound(_)) => {
                self.fallback.call_function(identifier, argument)
            }
            other => other,
        }
    }

    fn are_builtin_functions_disabled(&self) -> bool {
        self.local.are_builtin_functions_disabled()
    }

    fn set_builtin_functions_disabled(&mut self, disabled: bool) -> EvalexprResult<()> {
        self.local.set_builtin_functions_disabled(disabled)
    }
}

impl<'a, A, B> ContextWithMutableVariables for LayeredContext<'a, A, B>
where
    A: ContextWithMutableVariables,
    B: Context,
{
    fn set_value(&mut self, identifier: String, value: Value) -> EvalexprResult<()> {
        self.local.set_value(identifier, value)
    }
}

impl<'a, A, B> ContextWithMutableFunctions for LayeredContext<'a, A, B>
where
    A: ContextWithMutableFunctions,
    B: Context,
{
    fn set_function(&mut self, identifier: String, function: Function) -> EvalexprResult<()> {
        self.local.set_function(identifier, function)
    }
}

impl<'a, A, B> IterateVariablesContext for LayeredContext<'a, A, B>
where
    A: IterateVariablesContext,
    B: IterateVariablesContext,
{
    type VariableIterator<'b>
        = Chain<
        <A as IterateVariablesContext>::VariableIterator<'b>,
        <B as IterateVariablesContext>::VariableIterator<'b>,
    >
    where
        Self: 'b;
    type VariableNameIterator<'b>
        = Chain<
        <A as IterateVariablesContext>::VariableNameIterator<'b>,
        <B as IterateVariablesContext>::VariableNameIterator<'b>,
    >
    where
        Self: 'b;

    fn iter_variables(&self) -> Self::VariableIterator<'_> {
        self.local.iter_variables().chain(self.fallback.iter_variables())
    }

    fn iter_variable_names(&self) -> Self::VariableNameIterator<'_> {
        self.local
            .iter_variable_names()
            .chain(self.fallback.iter_variable_names())
    }
}

#[cfg(test)]
mod test {
    use evalexpr::{context_map, Context, ContextWithMutableVariables};

    use super::LayerableContext;

    #[test]
    fn local_shadows_fallback_and_takes_writes() {
        let fallback = context_map! { "a" => 1, "b" => 2 }.unwrap();
        let mut local = context_map! { "a" => 10 }.unwrap();
        let mut layered = local.layered_over(&fallback);

        assert_eq!(Some(&10.into()), layered.get_value("a"));
        assert_eq!(Some(&2.into()), layered.get_value("b"));

        layered.set_value("b".to_string(), 20.into()).unwrap();
        assert_eq!(Some(&20.into()), layered.get_value("b"));
        assert_eq!(Some(&2.into()), fallback.get_value("b"));
    }
}
