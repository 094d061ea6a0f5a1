use crate::chunk::Chunk;
use crate::compiler::Compiler;
use crate::config::Config;
use crate::error::{InterpretError, RuntimeError};
use crate::opcode::{Byte, OpCode};
use crate::value::Value;
use crate::value::Value::{Bool, Number};
use log::{log_enabled, trace, Level};
use stack::Stack;

mod stack;

/// Virtual machine that executes our program

#[derive(Debug)]
pub struct Vm {
    chunk: Chunk,
    stack: Stack,
    ip: usize,
    // Offset of the instruction being executed, for error reporting
    instruction: usize,
}

/// Runs a compiled chunk to completion.
pub fn interpret(chunk: Chunk) -> Result<Value, RuntimeError> {
    Vm::new(chunk).run()
}

/// Compiles and runs the source.
pub fn run_source(source: &str, config: &Config) -> Result<Value, InterpretError> {
    let chunk = Compiler::new(source, config.recovery)
        .with_binding(config.binding)
        .compile()?;

    if config.disassemble {
        chunk.disassemble("script")?;
    }

    Ok(interpret(chunk)?)
}

impl Vm {
    pub fn new(chunk: Chunk) -> Self {
        Vm {
            chunk,
            stack: Stack::new(),
            ip: 0,
            instruction: 0,
        }
    }

    /// Returns the next to fetch instruction location and advances the ip
    fn advance(&mut self) -> usize {
        let ip = self.ip;
        self.ip = ip + 1;
        ip
    }

    fn read_byte(&mut self) -> Option<Byte> {
        let at = self.advance();
        self.chunk.read_byte(at)
    }

    fn read_constant(&mut self) -> Result<Value, RuntimeError> {
        let index = self
            .chunk
            .read_short(self.ip)
            .ok_or(RuntimeError::TruncatedOperand {
                at: self.instruction,
            })?;
        self.ip += OpCode::Constant.operand_width();

        self.chunk
            .read_constant(index)
            .cloned()
            .ok_or(RuntimeError::MissingConstant { index })
    }

    fn push_stack(&mut self, value: Value) {
        self.stack.push(value)
    }

    fn pop_stack(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow {
            at: self.instruction,
        })
    }

    // Returns (lhs, rhs), the right operand is on top of the stack
    fn pop_operands(&mut self) -> Result<(Value, Value), RuntimeError> {
        let rhs = self.pop_stack()?;
        let lhs = self.pop_stack()?;
        Ok((lhs, rhs))
    }

    fn line(&self) -> usize {
        self.chunk.line_at(self.instruction).unwrap_or_default()
    }

    fn unary_error(&self, op: OpCode, operand: &Value) -> RuntimeError {
        RuntimeError::UnaryOperand {
            op,
            operand: operand.kind(),
            line: self.line(),
        }
    }

    fn binary_error(&self, op: OpCode, lhs: &Value, rhs: &Value) -> RuntimeError {
        RuntimeError::BinaryOperands {
            op,
            lhs: lhs.kind(),
            rhs: rhs.kind(),
            line: self.line(),
        }
    }

    pub fn run(&mut self) -> Result<Value, RuntimeError> {
        macro_rules! binary_op_number {
            ($code:expr, $op:tt) => {{
                match self.pop_operands()? {
                    (Number(lhs), Number(rhs)) => self.push_stack(Number(lhs $op rhs)),
                    (lhs, rhs) => return Err(self.binary_error($code, &lhs, &rhs)),
                }
            }};
        }

        macro_rules! binary_op_bool {
            ($code:expr, $op:tt) => {{
                match self.pop_operands()? {
                    (Number(lhs), Number(rhs)) => self.push_stack(Bool(lhs $op rhs)),
                    (lhs, rhs) => return Err(self.binary_error($code, &lhs, &rhs)),
                }
            }};
        }

        use OpCode::*;
        loop {
            let Some(code) = self.read_decode()? else {
                // Ran off the end of the code without a Return
                break Ok(Value::Nil);
            };

            match code {
                // We are done
                Return => {
                    let it = self.pop_stack()?;
                    trace!("return {}", it.repr());
                    break Ok(it);
                }

                Constant => {
                    let it = self.read_constant()?;
                    self.push_stack(it)
                }

                // Literals
                Nil => self.push_stack(Value::Nil),
                True => self.push_stack(Bool(true)),
                False => self.push_stack(Bool(false)),

                Pop => {
                    self.pop_stack()?;
                }

                // unary
                Negate => match self.pop_stack()? {
                    Number(it) => self.push_stack(Number(-it)),
                    other => return Err(self.unary_error(Negate, &other)),
                },
                Not => {
                    let it = self.pop_stack()?.is_truthy();
                    self.push_stack(Bool(!it));
                }

                // Arithmetic
                Add => match self.pop_operands()? {
                    (Number(lhs), Number(rhs)) => self.push_stack(Number(lhs + rhs)),
                    (Value::String(lhs), Value::String(rhs)) => {
                        let it = format!("{}{}", lhs, rhs);
                        self.push_stack(Value::from(it))
                    }
                    (lhs, rhs) => return Err(self.binary_error(Add, &lhs, &rhs)),
                },
                Subtract => binary_op_number!(Subtract, -),
                Multiply => binary_op_number!(Multiply, *),
                Divide => binary_op_number!(Divide, /),
                Reminder => binary_op_number!(Reminder, %),
                Exponentiate => match self.pop_operands()? {
                    (Number(lhs), Number(rhs)) => self.push_stack(Number(lhs.powf(rhs))),
                    (lhs, rhs) => return Err(self.binary_error(Exponentiate, &lhs, &rhs)),
                },

                // Comparison, equality works across all kinds
                Equal => {
                    let (lhs, rhs) = self.pop_operands()?;
                    self.push_stack(Bool(lhs == rhs));
                }
                NotEqual => {
                    let (lhs, rhs) = self.pop_operands()?;
                    self.push_stack(Bool(lhs != rhs));
                }
                Greater => binary_op_bool!(Greater, >),
                GreaterEqual => binary_op_bool!(GreaterEqual, >=),
                Less => binary_op_bool!(Less, <),
                LessEqual => binary_op_bool!(LessEqual, <=),
            }
        }
    }

    fn read_decode(&mut self) -> Result<Option<OpCode>, RuntimeError> {
        self.instruction = self.ip;

        // No more codes to fetch
        let Some(byte) = self.read_byte() else {
            return Ok(None);
        };
        let code = OpCode::try_from(byte).map_err(|byte| RuntimeError::UnknownOpcode {
            byte,
            at: self.instruction,
        })?;

        if log_enabled!(Level::Trace) {
            let (listing, _) = self.chunk.disassemble_instruction(self.instruction);
            trace!("{}    {}", listing, self.stack);
        }

        Ok(Some(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::config::{Binding, Recovery};
    use crate::value::ValueKind;

    fn run(source: &str) -> Result<Value, RuntimeError> {
        interpret(compile(source).unwrap())
    }

    fn interpret_result_eq_bool(cases: Vec<(&str, bool)>) {
        for (source, expected) in cases {
            assert_eq!(run(source), Ok(Bool(expected)), "{}", source);
        }
    }

    fn interpret_result_eq_number(cases: Vec<(&str, f64)>) {
        for (source, expected) in cases {
            assert_eq!(run(source), Ok(Number(expected)), "{}", source);
        }
    }

    fn interpret_result_eq_string(cases: Vec<(&str, &str)>) {
        for (source, expected) in cases {
            assert_eq!(run(source), Ok(Value::from(expected)), "{}", source);
        }
    }

    #[test]
    fn interpret_binary_number_operators() {
        let cases = vec![
            ("1 + 1", 2.0),
            ("1.1 + 1.1", 2.2),
            ("100000000 + 1000", 100001000.0),
            ("10 * 10", 100.0),
            ("10 / 3", 10.0 / 3.0),
            ("10 % 3", 1.0),
            ("-7 % 3", -1.0),
            ("7.5 % 2", 1.5),
            ("2^3", 8.0),
            ("1 - 10", -9.0),
        ];

        interpret_result_eq_number(cases)
    }

    #[test]
    fn interpret_math_expression_with_precedence() {
        let cases = vec![
            ("10 + 30 * 2", 80.0),
            ("1 + 2 * 3", 9.0),
            ("1 + 2 ^ 3", 9.0),
            ("10 * 2 + 1", 21.0),
            ("(10 + 30) * 2", 80.0),
            ("10 - 4 - 3", 3.0),
            ("2 * 3 ^ 2", 36.0),
            ("2 ^ 3 ^ 2", 64.0),
            ("-2 ^ 2", 4.0),
            ("--3", 3.0),
            ("1 + 10 % 4", 3.0),
        ];

        interpret_result_eq_number(cases)
    }

    #[test]
    fn adjacent_levels_group_left() {
        assert_eq!(
            run("true == 1 < 2"),
            Err(RuntimeError::BinaryOperands {
                op: OpCode::Less,
                lhs: ValueKind::Bool,
                rhs: ValueKind::Number,
                line: 1,
            })
        );
    }

    #[test]
    fn inclusive_binding_groups_tighter_operators_first() {
        let config = Config {
            binding: Binding::Inclusive,
            ..Config::default()
        };

        assert_eq!(run_source("1 + 2 * 3", &config).unwrap(), Number(7.0));
        assert_eq!(run_source("2 * 3 ^ 2", &config).unwrap(), Number(18.0));
        assert_eq!(run_source("true == 1 < 2", &config).unwrap(), Bool(true));
    }

    #[test]
    fn interpret_division_by_zero_follows_floats() {
        assert_eq!(run("1 / 0"), Ok(Number(f64::INFINITY)));
        assert_eq!(run("-1 / 0"), Ok(Number(f64::NEG_INFINITY)));
        assert!(run("0 / 0").unwrap().as_number().unwrap().is_nan());
        assert!(run("1 % 0").unwrap().as_number().unwrap().is_nan());
    }

    #[test]
    fn interpret_booleans() {
        interpret_result_eq_bool(vec![("true", true), ("false", false)])
    }

    #[test]
    fn interpret_nil() {
        assert_eq!(run("nil"), Ok(Value::Nil));
    }

    #[test]
    fn interpret_not() {
        let cases = vec![
            ("!false", true),
            ("!true", false),
            ("!!true", true),
            ("!!false", false),
            ("!(5 == 5)", false),
            ("!nil", true),
            ("!0", false),
            ("!1", false),
            ("!-1", false),
            ("!\"\"", false),
        ];

        interpret_result_eq_bool(cases)
    }

    #[test]
    fn interpret_equal() {
        let cases = vec![
            ("1 == 1", true),
            ("1.1 == 1.1", true),
            ("true == true", true),
            ("false == false", true),
            ("nil == nil", true),
            ("1 == 2", false),
            ("1.1 == 1.11", false),
            ("true == false", false),
            ("1 == true", false),
            ("0 == false", false),
            ("false == nil", false),
            ("\"1\" == 1", false),
            ("\"ab\" == \"a\" + \"b\"", true),
            ("\"a\" == \"a\" + \"b\"", false),
            ("!!true == !false", true),
        ];

        interpret_result_eq_bool(cases)
    }

    #[test]
    fn interpret_not_equal() {
        let cases = vec![
            ("return 1 != 1", false),
            ("return false != true", true),
            ("return false != nil", true),
            ("return \"a\" != \"b\"", true),
            ("return \"a\" != \"a\"", false),
            ("return 0 != false", true),
        ];

        interpret_result_eq_bool(cases);
    }

    #[test]
    fn interpret_comparison() {
        let cases = vec![
            ("return 1 < 2", true),
            ("return 1 < 1", false),
            ("return 2 > 1", true),
            ("return 1 > 1", false),
            ("return 2 >= 2", true),
            ("return 1 >= 2", false),
            ("return 3 <= 3", true),
            ("return 4 <= 3", false),
            ("1 + 1 == 2 * 1", true),
            ("!(5 - 4 > 3 * 2 == !nil)", true),
        ];

        interpret_result_eq_bool(cases)
    }

    #[test]
    fn interpret_strings() {
        let cases = vec![
            ("\"hello world\"", "hello world"),
            ("\"hello \" + \"world\"", "hello world"),
            ("\"hello\" + \" \"  + \"world\"", "hello world"),
            ("\"\" + \"\"", ""),
            ("\"no \\n escapes\"", "no \\n escapes"),
        ];

        interpret_result_eq_string(cases)
    }

    #[test]
    fn last_expression_is_the_result() {
        interpret_result_eq_number(vec![
            ("1 + 1", 2.0),
            ("1\n2\n3", 3.0),
            ("1; 2; 3;", 3.0),
            ("\n\n  4 * 2\n\n", 8.0),
        ]);
    }

    #[test]
    fn return_stops_execution() {
        interpret_result_eq_number(vec![("return 1\n2", 1.0), ("1\nreturn 5; 3", 5.0)]);
        assert_eq!(run("return"), Ok(Value::Nil));
        assert_eq!(run("return\n1"), Ok(Value::Nil));
    }

    #[test]
    fn empty_program_returns_nil() {
        assert_eq!(run(""), Ok(Value::Nil));
    }

    #[test]
    fn negate_requires_number() {
        assert_eq!(
            run("-true"),
            Err(RuntimeError::UnaryOperand {
                op: OpCode::Negate,
                operand: ValueKind::Bool,
                line: 1,
            })
        );
        assert_eq!(
            run("1\n2\n-\"a\""),
            Err(RuntimeError::UnaryOperand {
                op: OpCode::Negate,
                operand: ValueKind::String,
                line: 3,
            })
        );
    }

    #[test]
    fn arithmetic_requires_matching_kinds() {
        let cases = vec![
            ("true + 1", OpCode::Add, ValueKind::Bool, ValueKind::Number),
            ("\"a\" + 1", OpCode::Add, ValueKind::String, ValueKind::Number),
            ("1 + \"a\"", OpCode::Add, ValueKind::Number, ValueKind::String),
            ("nil + nil", OpCode::Add, ValueKind::Nil, ValueKind::Nil),
            ("\"a\" - \"a\"", OpCode::Subtract, ValueKind::String, ValueKind::String),
            ("nil * 2", OpCode::Multiply, ValueKind::Nil, ValueKind::Number),
            ("2 / false", OpCode::Divide, ValueKind::Number, ValueKind::Bool),
            ("2 % true", OpCode::Reminder, ValueKind::Number, ValueKind::Bool),
            ("\"2\" ^ 2", OpCode::Exponentiate, ValueKind::String, ValueKind::Number),
            ("\"a\" < \"b\"", OpCode::Less, ValueKind::String, ValueKind::String),
            ("1 <= nil", OpCode::LessEqual, ValueKind::Number, ValueKind::Nil),
            ("true > false", OpCode::Greater, ValueKind::Bool, ValueKind::Bool),
            ("1 >= \"1\"", OpCode::GreaterEqual, ValueKind::Number, ValueKind::String),
        ];

        for (source, op, lhs, rhs) in cases {
            assert_eq!(
                run(source),
                Err(RuntimeError::BinaryOperands {
                    op,
                    lhs,
                    rhs,
                    line: 1
                }),
                "{}",
                source
            );
        }
    }

    #[test]
    fn run_source_reports_both_phases() {
        let config = Config::default();

        assert_eq!(run_source("6 * 7", &config).unwrap(), Number(42.0));
        assert!(matches!(
            run_source("* 7", &config),
            Err(InterpretError::Compile(_))
        ));
        assert!(matches!(
            run_source("-nil", &config),
            Err(InterpretError::Runtime(RuntimeError::UnaryOperand { .. }))
        ));

        let sticky = Config {
            recovery: Recovery::Sticky,
            ..Config::default()
        };
        match run_source("+\n+", &sticky) {
            Err(InterpretError::Compile(err)) => assert_eq!(err.diagnostics.len(), 1),
            other => panic!("expected compile error, got {:?}", other),
        }
    }

    #[test]
    fn pipelines_run_independently_on_threads() {
        let handles = (0..4)
            .map(|n| {
                std::thread::spawn(move || {
                    let source = format!("{} * 10 + 1", n);
                    run_source(&source, &Config::default()).map(|it| it.to_string())
                })
            })
            .collect::<Vec<_>>();

        let results = handles
            .into_iter()
            .map(|it| it.join().unwrap().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(results, vec!["1", "11", "21", "31"]);
    }

    #[test]
    fn running_off_the_end_returns_nil() {
        let mut chunk = Chunk::new();
        chunk.write_code(OpCode::True, 1);

        assert_eq!(interpret(chunk), Ok(Value::Nil));
    }

    #[test]
    fn malformed_chunks_fail_cleanly() {
        let mut chunk = Chunk::new();
        chunk.write_code(OpCode::Pop, 1);
        assert_eq!(interpret(chunk), Err(RuntimeError::StackUnderflow { at: 0 }));

        let mut chunk = Chunk::new();
        chunk.write_code(OpCode::Nil, 1);
        chunk.push_code(0xee, 1);
        assert_eq!(
            interpret(chunk),
            Err(RuntimeError::UnknownOpcode { byte: 0xee, at: 1 })
        );

        let mut chunk = Chunk::new();
        chunk.write_code(OpCode::Constant, 1);
        chunk.push_code(0, 1);
        assert_eq!(
            interpret(chunk),
            Err(RuntimeError::TruncatedOperand { at: 0 })
        );

        let mut chunk = Chunk::new();
        chunk.write_code(OpCode::Constant, 1);
        chunk.write_short(5, 1);
        chunk.write_code(OpCode::Return, 1);
        assert_eq!(
            interpret(chunk),
            Err(RuntimeError::MissingConstant { index: 5 })
        );

        let mut chunk = Chunk::new();
        chunk.write_code(OpCode::Return, 1);
        assert_eq!(interpret(chunk), Err(RuntimeError::StackUnderflow { at: 0 }));
    }

    #[test]
    fn interpret_hand_written_chunk() {
        let mut chunk = Chunk::new();

        chunk.write_constant(Value::from(1.2), 1).unwrap();
        chunk.write_constant(Value::from(3.4), 1).unwrap();
        chunk.write_code(OpCode::Add, 1);
        chunk.write_constant(Value::from(5.6), 1).unwrap();
        chunk.write_code(OpCode::Divide, 1);
        chunk.write_code(OpCode::Negate, 1);
        chunk.write_code(OpCode::Return, 2);

        assert_eq!(interpret(chunk), Ok(Number(-((1.2 + 3.4) / 5.6))));
    }
}
