// src/noyau/expr.rs
//
// AST d’une ligne (après RPN).
// - Litteral : texte brut (chiffres ou nom), lu à l’évaluation avec la base d’entrée
// - les groupes ( … ) sont des sous-arbres possédés : pas de variables temporaires
// - profondeur bornée à la construction (rpn::PROFONDEUR_MAX)

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Litteral(String),

    Neg(Box<Expr>), // -x

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>), // x^(n/d) = root(x^n, d)

    Sqrt(Box<Expr>),            // √(x)
    Root(Box<Expr>, Box<Expr>), // root(x, n)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Litteral(s) => write!(f, "{s}"),
            Neg(x) => write!(f, "-({x})"),
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
            Pow(a, b) => write!(f, "({a}^{b})"),
            Sqrt(x) => write!(f, "√({x})"),
            Root(x, n) => write!(f, "root({x}, {n})"),
        }
    }
}
