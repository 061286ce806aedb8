#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub proto: Prototype,
    /// Statements in source order. The final element is the `return` expression.
    pub body: Vec<Expr>,
}

impl FunctionDef {
    pub fn return_value(&self) -> Option<&Expr> {
        self.body.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(i32),
    Variable(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_body: Vec<Expr>,
        else_body: Vec<Expr>,
    },
    For {
        init: Box<Expr>,
        cond: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Vec<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Expr::binary(BinaryOp::Assign, Expr::Variable(name.into()), value)
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            Expr::Binary {
                op: BinaryOp::Assign,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Assign,
}
