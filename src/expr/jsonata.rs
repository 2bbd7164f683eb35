//! A hand-rolled recursive-descent evaluator over a practical subset of
//! JSONata: path navigation, arithmetic/comparison/logical operators, the
//! ternary conditional, array indexing, and a handful of `$`-prefixed
//! built-in functions. No published `jsonata` crate exists in the
//! dependency graph this crate draws from, so the evaluator is implemented
//! directly, the way a hand-rolled parser/interpreter is built elsewhere in
//! this codebase's lineage.
//!
//! An unresolved path or variable reference evaluates to `Value::Null`
//! rather than erroring, matching AWS's "JSONata `undefined` maps to JSON
//! `null`" rule; only a genuine parse failure or an unknown function
//! surfaces as [`EvalError::Jsonata`].

use crate::error::EvalError;
use crate::expr::Bindings;
use serde_json::Value;

pub fn evaluate(expr: &str, data: &Value, bindings: &Bindings) -> Result<Value, EvalError> {
    let tokens = lex(expr).map_err(EvalError::Jsonata)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.parse_expr().map_err(EvalError::Jsonata)?;
    if parser.pos != parser.tokens.len() {
        return Err(EvalError::Jsonata(format!(
            "trailing input after expression at token {}",
            parser.pos
        )));
    }
    eval(&ast, data, bindings)
}

/// Evaluate a JSONata payload template: walks object/array structure as
/// literal JSON, except that any string value wrapped in `{% %}` is replaced
/// by the result of evaluating the enclosed expression. Used for
/// `Arguments`/`Output`/`Assign` in JSONata-mode states.
pub fn evaluate_template(template: &Value, data: &Value, bindings: &Bindings) -> Result<Value, EvalError> {
    match template {
        Value::String(s) => {
            if let Some(inner) = s.strip_prefix("{%").and_then(|rest| rest.strip_suffix("%}")) {
                evaluate(inner.trim(), data, bindings)
            } else {
                Ok(Value::String(s.clone()))
            }
        }
        Value::Object(obj) => {
            let mut out = serde_json::Map::new();
            for (key, value) in obj {
                out.insert(key.clone(), evaluate_template(value, data, bindings)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(|item| evaluate_template(item, data, bindings))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        scalar => Ok(scalar.clone()),
    }
}

// ---------------------------------------------------------------- lexer ---

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Str(String),
    Ident(String),
    Dollar,
    DollarIdent(String),
    Op(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Question,
    Colon,
}

fn lex(src: &str) -> Result<Vec<Tok>, String> {
    let mut out = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                out.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                out.push(Tok::RParen);
                i += 1;
            }
            '[' => {
                out.push(Tok::LBracket);
                i += 1;
            }
            ']' => {
                out.push(Tok::RBracket);
                i += 1;
            }
            '.' => {
                out.push(Tok::Dot);
                i += 1;
            }
            ',' => {
                out.push(Tok::Comma);
                i += 1;
            }
            '?' => {
                out.push(Tok::Question);
                i += 1;
            }
            ':' => {
                out.push(Tok::Colon);
                i += 1;
            }
            '&' => {
                out.push(Tok::Op("&".into()));
                i += 1;
            }
            '+' | '-' | '*' | '%' => {
                out.push(Tok::Op(c.to_string()));
                i += 1;
            }
            '/' => {
                out.push(Tok::Op("/".into()));
                i += 1;
            }
            '=' => {
                out.push(Tok::Op("=".into()));
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                out.push(Tok::Op("!=".into()));
                i += 2;
            }
            '<' | '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    out.push(Tok::Op(format!("{c}=")));
                    i += 2;
                } else {
                    out.push(Tok::Op(c.to_string()));
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    s.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err("unterminated string literal".to_string());
                }
                i += 1;
                out.push(Tok::Str(s));
            }
            '$' => {
                i += 1;
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                if i == start {
                    out.push(Tok::Dollar);
                } else {
                    out.push(Tok::DollarIdent(chars[start..i].iter().collect()));
                }
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n: f64 = text
                    .parse()
                    .map_err(|_| format!("invalid number literal '{text}'"))?;
                out.push(Tok::Num(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                out.push(Tok::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(out)
}

// --------------------------------------------------------------- parser ---

#[derive(Debug, Clone)]
enum Expr {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Root,
    Var(String),
    ArrayLit(Vec<Expr>),
    Field(Option<Box<Expr>>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    Unary(String, Box<Expr>),
    Binary(String, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

type PResult<T> = Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Tok> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn eat_op(&mut self, ops: &[&str]) -> Option<String> {
        if let Some(Tok::Op(o)) = self.peek() {
            if ops.contains(&o.as_str()) {
                let o = o.clone();
                self.pos += 1;
                return Some(o);
            }
        }
        None
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> PResult<Expr> {
        let cond = self.parse_or()?;
        if matches!(self.peek(), Some(Tok::Question)) {
            self.advance();
            let then_branch = self.parse_expr()?;
            match self.advance() {
                Some(Tok::Colon) => {}
                other => return Err(format!("expected ':' in ternary, got {other:?}")),
            }
            let else_branch = self.parse_expr()?;
            return Ok(Expr::Ternary(
                Box::new(cond),
                Box::new(then_branch),
                Box::new(else_branch),
            ));
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> PResult<Expr> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Tok::Ident(i)) if i == "or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Binary("or".into(), Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut left = self.parse_equality()?;
        while matches!(self.peek(), Some(Tok::Ident(i)) if i == "and") {
            self.advance();
            let right = self.parse_equality()?;
            left = Expr::Binary("and".into(), Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> PResult<Expr> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.eat_op(&["=", "!="]) {
            let right = self.parse_comparison()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut left = self.parse_concat()?;
        while let Some(op) = self.eat_op(&["<", "<=", ">", ">="]) {
            let right = self.parse_concat()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_concat(&mut self) -> PResult<Expr> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.eat_op(&["&"]) {
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.eat_op(&["+", "-"]) {
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.eat_op(&["-"]).is_some() {
            return Ok(Expr::Unary("-".into(), Box::new(self.parse_unary()?)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut base = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Tok::Dot) => {
                    self.advance();
                    match self.advance() {
                        Some(Tok::Ident(name)) => base = Expr::Field(Some(Box::new(base)), name),
                        other => return Err(format!("expected field name after '.', got {other:?}")),
                    }
                }
                Some(Tok::LBracket) => {
                    self.advance();
                    let index = self.parse_expr()?;
                    match self.advance() {
                        Some(Tok::RBracket) => {}
                        other => return Err(format!("expected ']', got {other:?}")),
                    }
                    base = Expr::Index(Box::new(base), Box::new(index));
                }
                _ => break,
            }
        }
        Ok(base)
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        match self.advance() {
            Some(Tok::LParen) => {}
            other => return Err(format!("expected '(', got {other:?}")),
        }
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(Tok::RParen)) {
            loop {
                args.push(self.parse_expr()?);
                if matches!(self.peek(), Some(Tok::Comma)) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        match self.advance() {
            Some(Tok::RParen) => {}
            other => return Err(format!("expected ')', got {other:?}")),
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        match self.advance() {
            Some(Tok::Num(n)) => Ok(Expr::Num(n)),
            Some(Tok::Str(s)) => Ok(Expr::Str(s)),
            Some(Tok::Ident(name)) if name == "true" => Ok(Expr::Bool(true)),
            Some(Tok::Ident(name)) if name == "false" => Ok(Expr::Bool(false)),
            Some(Tok::Ident(name)) if name == "null" => Ok(Expr::Null),
            Some(Tok::Ident(name)) if name == "not" && matches!(self.peek(), Some(Tok::LParen)) => {
                let args = self.parse_call_args()?;
                Ok(Expr::Call("not".into(), args))
            }
            Some(Tok::Ident(name)) => Ok(Expr::Field(None, name)),
            Some(Tok::Dollar) => Ok(Expr::Root),
            Some(Tok::DollarIdent(name)) if matches!(self.peek(), Some(Tok::LParen)) => {
                let args = self.parse_call_args()?;
                Ok(Expr::Call(name, args))
            }
            Some(Tok::DollarIdent(name)) => Ok(Expr::Var(name)),
            Some(Tok::LParen) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Tok::RParen) => Ok(inner),
                    other => Err(format!("expected ')', got {other:?}")),
                }
            }
            Some(Tok::LBracket) => {
                let mut items = Vec::new();
                if !matches!(self.peek(), Some(Tok::RBracket)) {
                    loop {
                        items.push(self.parse_expr()?);
                        if matches!(self.peek(), Some(Tok::Comma)) {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                match self.advance() {
                    Some(Tok::RBracket) => Ok(Expr::ArrayLit(items)),
                    other => Err(format!("expected ']', got {other:?}")),
                }
            }
            other => Err(format!("unexpected token {other:?}")),
        }
    }
}

// ------------------------------------------------------------- evaluator --

fn eval(expr: &Expr, data: &Value, bindings: &Bindings) -> Result<Value, EvalError> {
    Ok(match expr {
        Expr::Null => Value::Null,
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Num(n) => serde_json::json!(n),
        Expr::Str(s) => Value::String(s.clone()),
        Expr::Root => data.clone(),
        Expr::ArrayLit(items) => {
            let values = items
                .iter()
                .map(|i| eval(i, data, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(values)
        }
        Expr::Var(name) => resolve_var(name, bindings),
        Expr::Field(base, name) => {
            let base_val = match base {
                Some(inner) => eval(inner, data, bindings)?,
                None => data.clone(),
            };
            navigate_field(&base_val, name)
        }
        Expr::Index(base, idx) => {
            let base_val = eval(base, data, bindings)?;
            let idx_val = eval(idx, data, bindings)?;
            navigate_index(&base_val, &idx_val)
        }
        Expr::Call(name, args) => {
            let evaluated = args
                .iter()
                .map(|a| eval(a, data, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            call_builtin(name, &evaluated)?
        }
        Expr::Unary(op, inner) => {
            let v = eval(inner, data, bindings)?;
            match op.as_str() {
                "-" => serde_json::json!(-as_number(&v)),
                other => return Err(EvalError::Jsonata(format!("unknown unary operator '{other}'"))),
            }
        }
        Expr::Binary(op, left, right) => {
            let l = eval(left, data, bindings)?;
            let r = eval(right, data, bindings)?;
            eval_binary(op, &l, &r)?
        }
        Expr::Ternary(cond, then_branch, else_branch) => {
            let c = eval(cond, data, bindings)?;
            if is_truthy(&c) {
                eval(then_branch, data, bindings)?
            } else {
                eval(else_branch, data, bindings)?
            }
        }
    })
}

fn resolve_var(name: &str, bindings: &Bindings) -> Value {
    match name {
        "states" => serde_json::json!({
            "input": bindings.states_input.clone().unwrap_or(Value::Null),
            "result": bindings.states_result.clone().unwrap_or(Value::Null),
            "context": bindings.states_context.clone().unwrap_or(Value::Null),
        }),
        other => bindings.variables.get(other).cloned().unwrap_or(Value::Null),
    }
}

fn navigate_field(value: &Value, name: &str) -> Value {
    match value {
        Value::Object(obj) => obj.get(name).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn navigate_index(value: &Value, idx: &Value) -> Value {
    let Value::Array(arr) = value else {
        return Value::Null;
    };
    let Some(i) = idx.as_i64() else {
        return Value::Null;
    };
    let len = arr.len() as i64;
    let resolved = if i < 0 { len + i } else { i };
    if resolved < 0 || resolved >= len {
        return Value::Null;
    }
    arr[resolved as usize].clone()
}

fn as_number(v: &Value) -> f64 {
    v.as_f64().unwrap_or(0.0)
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_display_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn eval_binary(op: &str, l: &Value, r: &Value) -> Result<Value, EvalError> {
    Ok(match op {
        "and" => serde_json::json!(is_truthy(l) && is_truthy(r)),
        "or" => serde_json::json!(is_truthy(l) || is_truthy(r)),
        "&" => serde_json::json!(format!("{}{}", as_display_string(l), as_display_string(r))),
        "=" => serde_json::json!(values_equal(l, r)),
        "!=" => serde_json::json!(!values_equal(l, r)),
        "+" => serde_json::json!(as_number(l) + as_number(r)),
        "-" => serde_json::json!(as_number(l) - as_number(r)),
        "*" => serde_json::json!(as_number(l) * as_number(r)),
        "/" => serde_json::json!(as_number(l) / as_number(r)),
        "%" => serde_json::json!(as_number(l) % as_number(r)),
        "<" => serde_json::json!(compare(l, r)? == std::cmp::Ordering::Less),
        "<=" => serde_json::json!(compare(l, r)? != std::cmp::Ordering::Greater),
        ">" => serde_json::json!(compare(l, r)? == std::cmp::Ordering::Greater),
        ">=" => serde_json::json!(compare(l, r)? != std::cmp::Ordering::Less),
        other => return Err(EvalError::Jsonata(format!("unknown operator '{other}'"))),
    })
}

fn values_equal(l: &Value, r: &Value) -> bool {
    l == r
}

fn compare(l: &Value, r: &Value) -> Result<std::cmp::Ordering, EvalError> {
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| EvalError::Jsonata("cannot compare NaN".to_string()));
    }
    if let (Value::String(a), Value::String(b)) = (l, r) {
        return Ok(a.cmp(b));
    }
    Err(EvalError::Jsonata(format!(
        "cannot compare {l} and {r}"
    )))
}

fn call_builtin(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let bad = |reason: &str| EvalError::BadIntrinsicArgs {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    Ok(match name {
        "not" => serde_json::json!(!is_truthy(args.first().ok_or_else(|| bad("expects 1 argument"))?)),
        "uppercase" => serde_json::json!(as_display_string(args.first().ok_or_else(|| bad("expects 1 argument"))?).to_uppercase()),
        "lowercase" => serde_json::json!(as_display_string(args.first().ok_or_else(|| bad("expects 1 argument"))?).to_lowercase()),
        "length" => serde_json::json!(as_display_string(args.first().ok_or_else(|| bad("expects 1 argument"))?).chars().count()),
        "trim" => serde_json::json!(as_display_string(args.first().ok_or_else(|| bad("expects 1 argument"))?).trim()),
        "string" => serde_json::json!(as_display_string(args.first().ok_or_else(|| bad("expects 1 argument"))?)),
        "boolean" => serde_json::json!(is_truthy(args.first().ok_or_else(|| bad("expects 1 argument"))?)),
        "number" => {
            let v = args.first().ok_or_else(|| bad("expects 1 argument"))?;
            match v {
                Value::String(s) => serde_json::json!(
                    s.trim()
                        .parse::<f64>()
                        .map_err(|_| bad("cannot parse as number"))?
                ),
                other => serde_json::json!(as_number(other)),
            }
        }
        "round" => serde_json::json!(as_number(args.first().ok_or_else(|| bad("expects 1 argument"))?).round()),
        "substring" => {
            let s = as_display_string(args.first().ok_or_else(|| bad("expects at least 2 arguments"))?);
            let start = args.get(1).map(as_number).unwrap_or(0.0) as i64;
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len() as i64;
            let start = if start < 0 { (len + start).max(0) } else { start.min(len) };
            let count = args.get(2).map(as_number).map(|n| n as i64).unwrap_or(len - start);
            let end = (start + count).clamp(start, len);
            serde_json::json!(chars[start as usize..end as usize].iter().collect::<String>())
        }
        "split" => {
            let s = as_display_string(args.first().ok_or_else(|| bad("expects 2 arguments"))?);
            let delim = as_display_string(args.get(1).ok_or_else(|| bad("expects 2 arguments"))?);
            Value::Array(s.split(delim.as_str()).map(|p| serde_json::json!(p)).collect())
        }
        "join" => {
            let arr = args.first().and_then(Value::as_array).ok_or_else(|| bad("expects an array"))?;
            let delim = args.get(1).map(as_display_string).unwrap_or_default();
            let parts: Vec<String> = arr.iter().map(as_display_string).collect();
            serde_json::json!(parts.join(&delim))
        }
        "sum" => {
            let arr = args.first().and_then(Value::as_array).ok_or_else(|| bad("expects an array"))?;
            serde_json::json!(arr.iter().map(as_number).sum::<f64>())
        }
        "max" => {
            let arr = args.first().and_then(Value::as_array).ok_or_else(|| bad("expects an array"))?;
            serde_json::json!(arr.iter().map(as_number).fold(f64::MIN, f64::max))
        }
        "min" => {
            let arr = args.first().and_then(Value::as_array).ok_or_else(|| bad("expects an array"))?;
            serde_json::json!(arr.iter().map(as_number).fold(f64::MAX, f64::min))
        }
        other => return Err(EvalError::UnknownIntrinsic { name: other.to_string() }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings() -> Bindings {
        Bindings::new()
    }

    #[test]
    fn evaluates_comparison_against_states_input() {
        let b = Bindings::new().with_states_input(json!({"x": 5}));
        let result = evaluate("$states.input.x > 10", &Value::Null, &b).unwrap();
        assert_eq!(result, json!(false));
    }

    #[test]
    fn evaluates_string_literal() {
        assert_eq!(evaluate("'small'", &Value::Null, &bindings()).unwrap(), json!("small"));
    }

    #[test]
    fn ternary_and_logical_operators() {
        let result = evaluate("true and false ? 1 : 2", &Value::Null, &bindings()).unwrap();
        assert_eq!(result, json!(2));
    }

    #[test]
    fn negative_array_index() {
        let data = json!({"items": [1, 2, 3]});
        assert_eq!(evaluate("items[-1]", &data, &bindings()).unwrap(), json!(3));
    }

    #[test]
    fn undefined_field_maps_to_null() {
        let data = json!({"a": 1});
        assert_eq!(evaluate("b.c", &data, &bindings()).unwrap(), Value::Null);
    }

    #[test]
    fn string_builtins() {
        assert_eq!(
            evaluate("$uppercase('abc')", &Value::Null, &bindings()).unwrap(),
            json!("ABC")
        );
    }

    #[test]
    fn evaluate_template_only_expands_wrapped_strings() {
        let data = json!({"x": 2});
        let template = json!({"doubled": "{% x * 2 %}", "literal": "x"});
        let result = evaluate_template(&template, &data, &bindings()).unwrap();
        assert_eq!(result, json!({"doubled": 4, "literal": "x"}));
    }
}
