// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Human-readable reports on programs and the class catalog.

use maki_interpreter::registry::{ClassRegistry, ValueType};
use maki_interpreter::{Program, Value};
use owo_colors::OwoColorize;

/// Prints the header and every table of a program.
pub fn print_program(program: &Program) {
    println!(
        "{} version {:#06x} (format {}), extra {:#010x}",
        "Program".white().bold(),
        program.version(),
        program.format_major(),
        program.extra()
    );

    section("Classes", program.classes().len());
    for (i, class) in program.classes().iter().enumerate() {
        println!("  {:>4}  {}  {}", i, class.key.dimmed(), class.name.cyan());
    }

    section("Methods", program.methods().len());
    for (i, method) in program.methods().iter().enumerate() {
        let signature = match method.signature {
            Some(f) => {
                let params: Vec<_> = f.parameters.iter().map(|p| format!("{} {}", p.ty, p.name)).collect();
                let ret = f.return_type.map(|r| format!(" -> {r}")).unwrap_or_default();
                format!("({}){ret}", params.join(", "))
            }
            None => "(undeclared)".red().to_string(),
        };
        println!(
            "  {:>4}  {} {}",
            i,
            program.qualified_name(i).green(),
            signature.dimmed()
        );
    }

    section("Variables", program.variables().len());
    for (i, var) in program.variables().iter().enumerate() {
        let mut flags = Vec::new();
        if var.system {
            flags.push("system");
        }
        if !var.global {
            flags.push("local");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {:>4}  {:<12} {}{}",
            i,
            type_label(var.ty).yellow(),
            format_value(&var.initial),
            flags.dimmed()
        );
    }

    section("Bindings", program.bindings().len());
    for binding in program.bindings() {
        println!(
            "  v{:<4} {} -> {:04x}",
            binding.variable,
            program.qualified_name(binding.method).green(),
            binding.offset
        );
    }

    println!();
    println!(
        "{} {} instructions, {} bytes",
        "Code:".white().bold(),
        program.code().len(),
        program.code_len()
    );
}

/// Prints one line per instruction, marking handler entry points.
pub fn print_disassembly(program: &Program) {
    for (index, insn) in program.code().iter().enumerate() {
        for binding in program.bindings().iter().filter(|b| b.entry == index) {
            println!(
                "{}",
                format!(
                    "; v{} {}",
                    binding.variable,
                    program.qualified_name(binding.method)
                )
                .bright_blue()
            );
        }
        let operand = program.operand_text(insn);
        println!(
            "{}  {:<12} {}",
            format!("{:04x}", insn.offset).dimmed(),
            insn.op.mnemonic().cyan(),
            operand
        );
    }
}

/// Prints the catalog: one line per class, or a full listing of `name`.
pub fn print_classes(name: Option<&str>) -> anyhow::Result<()> {
    let registry = ClassRegistry::standard();
    let Some(name) = name else {
        for class in registry.all_classes() {
            println!(
                "{:<24} {:<20} {}",
                class.name.cyan(),
                class.parent.unwrap_or("-").dimmed(),
                class.key.dimmed()
            );
        }
        return Ok(());
    };

    let class = registry.describe_name(name)?;
    let chain: Vec<_> = registry.ancestry(class.name).map(|c| c.name).collect();
    println!("{} {}", class.name.cyan().bold(), class.key.dimmed());
    println!("  {}", chain.join(" < ").dimmed());
    for ancestor in registry.ancestry(class.name) {
        if ancestor.functions.is_empty() {
            continue;
        }
        println!();
        println!("  {}", format!("from {}", ancestor.name).white().bold());
        for f in ancestor.functions {
            let params: Vec<_> = f.parameters.iter().map(|p| format!("{} {}", p.ty, p.name)).collect();
            let ret = f.return_type.map(|r| format!(" -> {r}")).unwrap_or_default();
            let name = if f.is_hook() {
                f.name.magenta().to_string()
            } else {
                f.name.green().to_string()
            };
            println!("    {name}({}){}", params.join(", "), ret.dimmed());
        }
    }
    Ok(())
}

/// Catalog spelling of a value type.
pub fn type_label(ty: ValueType) -> &'static str {
    match ty {
        ValueType::Int => "Int",
        ValueType::Float => "Float",
        ValueType::Double => "Double",
        ValueType::Boolean => "Boolean",
        ValueType::String => "String",
        ValueType::Any => "Any",
        ValueType::Object(class) => class,
    }
}

/// Colored value for terminal output.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Void => "void".blue().dimmed().to_string(),
        Value::Null => "null".blue().to_string(),
        Value::Boolean(b) => b.to_string().yellow().to_string(),
        Value::Int(n) => n.to_string().yellow().to_string(),
        Value::Float(n) => n.to_string().yellow().to_string(),
        Value::String(s) => format!("{s:?}").green().to_string(),
        Value::Object(r) => format!("object{r}").cyan().to_string(),
    }
}

fn section(title: &str, count: usize) {
    println!();
    println!("{} ({count})", format!("{title}:").white().bold());
}
