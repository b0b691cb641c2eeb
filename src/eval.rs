use crate::{
    ast::{Group, Node, Symbol},
    error::EvalError,
    value::{canonical_float, canonical_integer, Constant, Family},
};

///
/// One slot of the fold buffer: a resolved operand, or an operator between two.
///
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Operand(Constant),
    Symbol(Symbol),
}

///
/// Evaluate a group and everything nested in it down to one value.
///
/// The tree is only read; folding happens in a buffer owned by each call.
///
#[allow(clippy::missing_errors_doc)]
pub fn evaluate(group: &Group) -> Result<Constant, EvalError> {
    let mut items = group
        .nodes()
        .iter()
        .map(leaf)
        .collect::<Result<Vec<_>, _>>()?;

    let family = governing_family(&items).ok_or(EvalError::Malformed)?;
    if family == Family::Str {
        if let Some(symbol) = items.iter().find_map(|item| match item {
            Item::Symbol(s) if *s != Symbol::Add => Some(*s),
            _ => None,
        }) {
            return Err(EvalError::UnsupportedOperator { symbol, family });
        }
    }

    for tier in Symbol::TIERS {
        fold_tier(&mut items, tier, family)?;
    }

    match (items.pop(), items.is_empty()) {
        (Some(Item::Operand(value)), true) => Ok(value),
        _ => Err(EvalError::Malformed),
    }
}

fn leaf(node: &Node) -> Result<Item, EvalError> {
    Ok(match node {
        Node::Constant(c) => Item::Operand(c.clone()),
        Node::Group(g) => Item::Operand(evaluate(g)?),
        Node::Symbol(s) => Item::Symbol(*s),
        Node::Variable(v) => {
            let value = v
                .value()
                .cloned()
                .ok_or_else(|| EvalError::UnresolvedVariable {
                    name: v.name().to_owned(),
                })?;
            Item::Operand(value.canonical()?)
        }
    })
}

fn governing_family(items: &[Item]) -> Option<Family> {
    items
        .iter()
        .filter_map(|item| match item {
            Item::Operand(c) => Some(c.family()),
            Item::Symbol(_) => None,
        })
        .max()
}

///
/// One left-to-right pass combining every `tier` symbol with its neighbours.
///
/// The three slots collapse into the result, so a chain of the same symbol
/// keeps folding into the leftmost slot.
///
fn fold_tier(items: &mut Vec<Item>, tier: Symbol, family: Family) -> Result<(), EvalError> {
    let mut i = 1;
    while i + 1 < items.len() {
        if items[i] != Item::Symbol(tier) {
            i += 2;
            continue;
        }

        let (Item::Operand(lhs), Item::Operand(rhs)) = (&items[i - 1], &items[i + 1]) else {
            return Err(EvalError::Malformed);
        };
        let result = apply(tier, family, lhs, rhs)?;
        tracing::trace!(%tier, %lhs, %rhs, %result, "folded");

        items.splice(i - 1..=i + 1, [Item::Operand(result)]);
    }
    Ok(())
}

///
/// Combine two operands under the arithmetic of `family`.
///
#[allow(clippy::missing_errors_doc)]
pub fn apply(
    symbol: Symbol,
    family: Family,
    lhs: &Constant,
    rhs: &Constant,
) -> Result<Constant, EvalError> {
    match family {
        Family::Str => match symbol {
            Symbol::Add => Ok(Constant::Str(format!("{lhs}{rhs}"))),
            _ => Err(EvalError::UnsupportedOperator { symbol, family }),
        },
        Family::Float => {
            let (Some(l), Some(r)) = (lhs.as_float(), rhs.as_float()) else {
                return Err(EvalError::Malformed);
            };
            canonical_float(float_op(symbol, l, r)?)
        }
        Family::Int | Family::Long | Family::UInt | Family::ULong => {
            let (Some(l), Some(r)) = (lhs.as_integer(), rhs.as_integer()) else {
                return Err(EvalError::Malformed);
            };
            integer_op(symbol, l, r)
        }
    }
}

//
// 128 bits hold every i64 and u64 operand, so both integer domains share it.
// Past that the result is only approximated, as a double.
//
#[allow(clippy::cast_precision_loss)]
fn integer_op(symbol: Symbol, l: i128, r: i128) -> Result<Constant, EvalError> {
    if r == 0 && matches!(symbol, Symbol::Div | Symbol::Mod) {
        return Err(EvalError::DivisionByZero { symbol });
    }

    let exact = match symbol {
        Symbol::Add => l.checked_add(r),
        Symbol::Sub => l.checked_sub(r),
        Symbol::Mul => l.checked_mul(r),
        Symbol::Div => l.checked_div(r),
        Symbol::Mod => l.checked_rem(r),
    };
    match exact {
        Some(i) => Ok(canonical_integer(i)),
        None => canonical_float(float_op(symbol, l as f64, r as f64)?),
    }
}

#[allow(clippy::float_cmp)]
fn float_op(symbol: Symbol, l: f64, r: f64) -> Result<f64, EvalError> {
    if r == 0.0 && matches!(symbol, Symbol::Div | Symbol::Mod) {
        return Err(EvalError::DivisionByZero { symbol });
    }

    Ok(match symbol {
        Symbol::Add => l + r,
        Symbol::Sub => l - r,
        Symbol::Mul => l * r,
        Symbol::Div => l / r,
        Symbol::Mod => l % r,
    })
}
