use elim_model::{Kind, Value};

/// Observes every property value of a freshly built model.
///
/// `kind` is the declared kind of the property; `value.kind()` is what was actually stored.
pub trait Visitor<M> {
    fn visit_value(&mut self, model: &M, name: &str, kind: Kind, value: &Value);
}

impl<M, F> Visitor<M> for F
where
    F: FnMut(&M, &str, Kind, &Value),
{
    fn visit_value(&mut self, model: &M, name: &str, kind: Kind, value: &Value) {
        self(model, name, kind, value);
    }
}

/// Fans a visit out to several visitors in order.
pub struct Visitors<'a, M> {
    visitors: Vec<&'a mut dyn Visitor<M>>,
}

impl<'a, M> Visitors<'a, M> {
    #[must_use]
    pub const fn new() -> Self {
        Self { visitors: Vec::new() }
    }

    #[must_use = "chain returns the extended visitor list"]
    pub fn chain(mut self, visitor: &'a mut dyn Visitor<M>) -> Self {
        self.visitors.push(visitor);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visitors.len()
    }
}

impl<M> Default for Visitors<'_, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for Visitors<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitors").field("len", &self.visitors.len()).finish()
    }
}

impl<M> Visitor<M> for Visitors<'_, M> {
    fn visit_value(&mut self, model: &M, name: &str, kind: Kind, value: &Value) {
        for visitor in &mut self.visitors {
            visitor.visit_value(model, name, kind, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_visitors_see_every_value_in_order() {
        let mut first = Vec::new();
        let mut second = 0_usize;
        {
            let mut record = |_: &(), name: &str, _: Kind, _: &Value| first.push(name.to_owned());
            let mut count = |_: &(), _: &str, _: Kind, _: &Value| second += 1;
            let mut chain = Visitors::new().chain(&mut record).chain(&mut count);
            chain.visit_value(&(), "radius", Kind::Float, &Value::Float(1.0));
            chain.visit_value(&(), "maxAmount", Kind::Int, &Value::Int(2));
        }
        assert_eq!(first, ["radius", "maxAmount"]);
        assert_eq!(second, 2);
    }
}
