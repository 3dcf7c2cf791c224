// ----------------------------
// File: src/front/semantics/mod.rs
// ----------------------------
//! Semantic analysis: annotates every expression with a `DataType`, checks
//! names and type compatibility, and accumulates all errors instead of
//! stopping at the first one.

mod types;
pub use types::{common_type, compatible};

use crate::error::SemanticError;
use crate::front::ast::*;
use crate::symtab::{FunctionSymbol, Symbol, SymbolTable};

pub struct SemanticAnalyzer {
    table: SymbolTable,
    current_return_type: DataType,
    errors: Vec<SemanticError>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut table = SymbolTable::new();

        // built-ins available to every program
        table.declare_function("println", FunctionSymbol {
            name: "println".to_string(),
            return_type: DataType::Void,
            param_types: vec![DataType::Int],
            param_names: vec!["value".to_string()],
        });
        table.declare_function("printf", FunctionSymbol {
            name: "printf".to_string(),
            return_type: DataType::Int,
            param_types: vec![DataType::Str, DataType::Int],
            param_names: vec!["format".to_string(), "value".to_string()],
        });

        Self { table, current_return_type: DataType::Void, errors: Vec::new() }
    }

    /// Walk the whole program; returns every error found, in source order.
    pub fn analyze(mut self, program: &mut Program) -> Vec<SemanticError> {
        for func in &mut program.functions {
            self.visit_function(func);
        }
        if self.table.lookup_function("main").is_none() {
            self.errors.push(SemanticError::MissingMain);
        }
        self.errors
    }

    fn error(&mut self, err: SemanticError) {
        self.errors.push(err);
    }

    fn visit_function(&mut self, func: &mut FunctionDecl) {
        let sym = FunctionSymbol {
            name: func.name.clone(),
            return_type: func.return_type,
            param_types: func.params.iter().map(|p| p.ty).collect(),
            param_names: func.params.iter().map(|p| p.name.clone()).collect(),
        };
        if !self.table.declare_function(&func.name, sym) {
            self.error(SemanticError::FunctionRedeclaration(func.name.clone()));
        }

        self.table.enter_scope();
        self.table.reset_offset();
        self.current_return_type = func.return_type;

        // parameters are spilled into local slots at entry, so their
        // offsets come from the same allocator as ordinary locals
        for param in &func.params {
            let offset = self.table.allocate_stack_space(8);
            let _ = self.table.declare_variable(&param.name, Symbol {
                name: param.name.clone(),
                ty: param.ty,
                is_mutable: true,
                is_parameter: true,
                offset,
                array_dims: param.array_dims.clone(),
            });
        }

        self.visit_stmt(&mut func.body);
        self.table.exit_scope();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::VarDecl { name, ty, initializer, array_dims, is_mutable, .. } => {
                if let Some(init) = initializer {
                    self.visit_expr(init);
                    if !compatible(*ty, init.ty) {
                        self.error(SemanticError::DeclTypeMismatch {
                            name: name.clone(),
                            declared: *ty,
                            found: init.ty,
                        });
                    }
                }

                let mut size = 8;
                for &dim in array_dims.iter() {
                    if dim > 0 {
                        size *= dim;
                    }
                }
                let offset = self.table.allocate_stack_space(size);

                let sym = Symbol {
                    name: name.clone(),
                    ty: *ty,
                    is_mutable: *is_mutable,
                    is_parameter: false,
                    offset,
                    array_dims: array_dims.clone(),
                };
                if !self.table.declare_variable(name, sym) {
                    self.error(SemanticError::Redeclaration(name.clone()));
                }
            }
            Stmt::Assign { target, value } => {
                self.visit_expr(target);
                self.visit_expr(value);
                if !target.is_lvalue {
                    self.error(SemanticError::NotAnLValue);
                }
                if !compatible(target.ty, value.ty) {
                    self.error(SemanticError::AssignTypeMismatch {
                        target: target.ty,
                        found: value.ty,
                    });
                }
            }
            Stmt::Expr(expr) => self.visit_expr(expr),
            Stmt::If { condition, then_branch, else_branch } => {
                // any scalar condition is accepted, as in C
                self.visit_expr(condition);
                self.visit_stmt(then_branch);
                if let Some(els) = else_branch {
                    self.visit_stmt(els);
                }
            }
            Stmt::While { condition, body } => {
                self.visit_expr(condition);
                self.visit_stmt(body);
            }
            Stmt::For { var, start, end, body } => {
                self.table.enter_scope();
                let offset = self.table.allocate_stack_space(8);
                let _ = self.table.declare_variable(var, Symbol {
                    name: var.clone(),
                    ty: DataType::Int,
                    is_mutable: false,
                    is_parameter: false,
                    offset,
                    array_dims: Vec::new(),
                });
                self.visit_expr(start);
                self.visit_expr(end);
                self.visit_stmt(body);
                self.table.exit_scope();
            }
            Stmt::Block(statements) => {
                self.table.enter_scope();
                for s in statements {
                    self.visit_stmt(s);
                }
                self.table.exit_scope();
            }
            Stmt::Return { value, .. } => match value {
                Some(expr) => {
                    self.visit_expr(expr);
                    if !compatible(self.current_return_type, expr.ty) {
                        self.error(SemanticError::ReturnTypeMismatch {
                            expected: self.current_return_type,
                            found: expr.ty,
                        });
                    }
                }
                None => {
                    if self.current_return_type != DataType::Void {
                        self.error(SemanticError::MissingReturnValue);
                    }
                }
            },
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Binary { op, left, right } => {
                let op = *op;
                self.visit_expr(left);
                self.visit_expr(right);
                expr.ty = if op.is_arithmetic() {
                    common_type(left.ty, right.ty)
                } else {
                    // comparisons and logicals yield a boolean-as-int
                    DataType::Int
                };
            }
            ExprKind::Unary { operand, .. } => {
                self.visit_expr(operand);
                expr.ty = operand.ty;
            }
            ExprKind::Ternary { condition, then_expr, else_expr } => {
                self.visit_expr(condition);
                self.visit_expr(then_expr);
                self.visit_expr(else_expr);
                expr.ty = common_type(then_expr.ty, else_expr.ty);
            }
            ExprKind::Literal { .. } => {
                // type set at construction from the token
            }
            ExprKind::Identifier { name } => {
                match self.table.lookup(name) {
                    Some(sym) => expr.ty = sym.ty,
                    None => {
                        let name = name.clone();
                        self.error(SemanticError::UndefinedVariable(name));
                        expr.ty = DataType::Unknown;
                    }
                }
            }
            ExprKind::ArrayAccess { array, indices } => {
                self.visit_expr(array);
                for index in indices.iter_mut() {
                    self.visit_expr(index);
                    if index.ty != DataType::Int && index.ty != DataType::Long {
                        self.error(SemanticError::NonIntegerIndex);
                    }
                }
                // element type comes from the array symbol
                if let ExprKind::Identifier { name } = &array.kind {
                    if let Some(sym) = self.table.lookup(name) {
                        expr.ty = sym.ty;
                    }
                } else {
                    self.error(SemanticError::UnnamedArrayBase);
                }
            }
            ExprKind::Call { name, args } => {
                let func = match self.table.lookup_function(name) {
                    Some(f) => f.clone(),
                    None => {
                        let name = name.clone();
                        for arg in args.iter_mut() {
                            self.visit_expr(arg);
                        }
                        self.error(SemanticError::UndefinedFunction(name));
                        expr.ty = DataType::Unknown;
                        return;
                    }
                };

                // printf is variadic: only its format string is checked
                let is_variadic = name.as_str() == "printf";
                if !is_variadic && func.param_types.len() != args.len() {
                    let name = name.clone();
                    self.error(SemanticError::ArityMismatch {
                        name,
                        expected: func.param_types.len(),
                        got: args.len(),
                    });
                }

                let name = name.clone();
                for (i, arg) in args.iter_mut().enumerate() {
                    self.visit_expr(arg);
                    // for the variadic builtin only the format string is checked
                    let checked = if is_variadic { i == 0 } else { i < func.param_types.len() };
                    if checked && !compatible(func.param_types[i], arg.ty) {
                        self.error(SemanticError::ArgumentTypeMismatch {
                            name: name.clone(),
                            index: i + 1,
                        });
                    }
                }

                expr.ty = func.return_type;
            }
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
