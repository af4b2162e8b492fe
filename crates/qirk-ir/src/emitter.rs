//! Textual LLVM IR emitter.

use crate::module::{Attribute, Function, GlobalString, Module, escape_string, format_name};

/// Emit a module as canonical textual IR.
///
/// Layout: header, opaque types, global strings, declarations, definitions,
/// then attribute groups numbered in order of first use. Functions with the
/// same attribute set share one group.
pub fn emit(module: &Module) -> String {
    let mut emitter = Emitter::new();
    emitter.emit_module(module);
    emitter.finish()
}

struct Emitter {
    output: String,
    groups: Vec<Vec<Attribute>>,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            groups: vec![],
        }
    }

    fn emit_module(&mut self, module: &Module) {
        self.writeln(&format!("; ModuleID = '{}'", escape_string(module.name.as_bytes())));
        if let Some(source) = &module.source_filename {
            self.writeln(&format!(
                "source_filename = \"{}\"",
                escape_string(source.as_bytes())
            ));
        }

        if !module.opaque_types.is_empty() {
            self.writeln("");
            for name in &module.opaque_types {
                self.writeln(&format!("%{} = type opaque", format_name(name)));
            }
        }

        if !module.globals.is_empty() {
            self.writeln("");
            for global in &module.globals {
                self.emit_global(global);
            }
        }

        for function in module.declarations() {
            self.writeln("");
            self.emit_header("declare", function);
        }

        for function in module.definitions() {
            self.writeln("");
            self.emit_definition(function);
        }

        if !self.groups.is_empty() {
            self.writeln("");
            let groups = std::mem::take(&mut self.groups);
            for (id, attrs) in groups.iter().enumerate() {
                let body = attrs
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.writeln(&format!("attributes #{id} = {{ {body} }}"));
            }
        }
    }

    fn emit_global(&mut self, global: &GlobalString) {
        self.writeln(&format!(
            "@{} = internal constant [{} x i8] c\"{}\"",
            format_name(&global.name),
            global.len(),
            escape_string(&global.bytes)
        ));
    }

    fn emit_header(&mut self, keyword: &str, function: &Function) {
        let params = function
            .params
            .iter()
            .map(|p| match &p.name {
                Some(name) => format!("{} %{}", p.ty, format_name(name)),
                None => p.ty.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mut line = format!(
            "{keyword} {} @{}({params})",
            function.ret,
            format_name(&function.name)
        );
        if !function.attributes.is_empty() {
            let id = self.group_id(&function.attributes);
            line.push_str(&format!(" #{id}"));
        }
        if keyword == "define" {
            line.push_str(" {");
        }
        self.writeln(&line);
    }

    fn emit_definition(&mut self, function: &Function) {
        self.emit_header("define", function);
        for (i, block) in function.blocks.iter().enumerate() {
            if i > 0 {
                self.writeln("");
            }
            self.writeln(&format!("{}:", format_name(&block.label)));
            for instruction in &block.instructions {
                self.writeln(&format!("  {instruction}"));
            }
        }
        self.writeln("}");
    }

    fn group_id(&mut self, attrs: &[Attribute]) -> usize {
        if let Some(id) = self.groups.iter().position(|g| g.as_slice() == attrs) {
            return id;
        }
        self.groups.push(attrs.to_vec());
        self.groups.len() - 1
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModuleBuilder;
    use crate::qubit::{QubitId, ResultId};

    #[test]
    fn test_emit_bell() {
        let mut builder = ModuleBuilder::new("bell", 2, 2).unwrap();
        builder.h(QubitId(0)).unwrap();
        builder.cx(QubitId(0), QubitId(1)).unwrap();
        builder.mz(QubitId(0), ResultId(0)).unwrap();
        builder.mz(QubitId(1), ResultId(1)).unwrap();
        builder.emit_return().unwrap();
        let ir = emit(&builder.finish().unwrap());

        let expected = "\
; ModuleID = 'bell'
source_filename = \"bell\"

%Qubit = type opaque
%Result = type opaque

declare void @__quantum__qis__h__body(%Qubit*)

declare void @__quantum__qis__cnot__body(%Qubit*, %Qubit*)

declare void @__quantum__qis__mz__body(%Qubit*, %Result*) #0

define void @main() #1 {
entry:
  call void @__quantum__qis__h__body(%Qubit* null)
  call void @__quantum__qis__cnot__body(%Qubit* null, %Qubit* inttoptr (i64 1 to %Qubit*))
  call void @__quantum__qis__mz__body(%Qubit* null, %Result* null)
  call void @__quantum__qis__mz__body(%Qubit* inttoptr (i64 1 to %Qubit*), %Result* inttoptr (i64 1 to %Result*))
  ret void
}

attributes #0 = { \"irreversible\" }
attributes #1 = { \"entry_point\" \"num_required_qubits\"=\"2\" \"num_required_results\"=\"2\" \"output_labeling_schema\" \"qir_profiles\"=\"custom\" }
";
        assert_eq!(ir, expected);
    }

    #[test]
    fn test_emit_branches_and_labels() {
        let mut builder = ModuleBuilder::new("if", 1, 1).unwrap();
        builder.mz(QubitId(0), ResultId(0)).unwrap();
        builder
            .if_result(ResultId(0), |b| b.x(QubitId(0)).map(|_| ()), |_| Ok(()))
            .unwrap();
        builder.result_record_output(ResultId(0), Some("r0")).unwrap();
        builder.emit_return().unwrap();
        let ir = emit(&builder.finish().unwrap());

        assert!(ir.contains("@0 = internal constant [3 x i8] c\"r0\\00\""));
        assert!(ir.contains("  %0 = call i1 @__quantum__qis__read_result__body(%Result* null)"));
        assert!(ir.contains("  br i1 %0, label %then, label %else"));
        assert!(ir.contains("\nthen:\n  call void @__quantum__qis__x__body(%Qubit* null)\n  br label %continue\n"));
        assert!(ir.contains("\nelse:\n  br label %continue\n"));
        assert!(ir.contains(
            "call void @__quantum__rt__result_record_output(%Result* null, i8* getelementptr inbounds ([3 x i8], [3 x i8]* @0, i64 0, i64 0))"
        ));
    }

    #[test]
    fn test_shared_attribute_groups() {
        let mut builder = ModuleBuilder::new("m", 1, 2).unwrap();
        builder.mz(QubitId(0), ResultId(0)).unwrap();
        builder.mresetz(QubitId(0), ResultId(1)).unwrap();
        builder.emit_return().unwrap();
        let ir = emit(&builder.finish().unwrap());
        assert_eq!(ir.matches("attributes #").count(), 2);
        assert!(ir.contains("declare void @__quantum__qis__mresetz__body(%Qubit*, %Result*) #0"));
    }

    #[test]
    fn test_emit_is_pure() {
        let mut builder = ModuleBuilder::new("m", 1, 0).unwrap();
        builder.h(QubitId(0)).unwrap();
        builder.emit_return().unwrap();
        let module = builder.finish().unwrap();
        assert_eq!(emit(&module), emit(&module));
    }
}
