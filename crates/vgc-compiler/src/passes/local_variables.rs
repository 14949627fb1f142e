//! Local-variable replacement.
//!
//! A declaration node names a value; usage nodes reference it by name
//! without drawing a wire. This pass wires every usage's consumers straight
//! to the declaration's source, after which both node kinds are dead.

use std::collections::HashMap;

use vgc_ir::{CompilationNode, Handle, NodeKind};

use crate::compiler::GraphCompiler;
use crate::error::CompileError;
use crate::Pass;

#[derive(Debug)]
pub struct ReplaceLocalVariablesPass;

impl Pass for ReplaceLocalVariablesPass {
    fn name(&self) -> &str {
        "replace-local-variables"
    }

    fn run(&self, compiler: &mut GraphCompiler<'_>) -> Result<(), CompileError> {
        let mut declarations: HashMap<String, Handle<CompilationNode>> = HashMap::new();
        for (handle, node) in compiler.graph.nodes.iter() {
            if let NodeKind::LocalVariableDeclaration { name, .. } = &node.kind {
                if declarations.insert(name.clone(), handle).is_some() {
                    let message = format!("local variable {name:?} is declared more than once");
                    compiler
                        .reporter
                        .error_on_node(node.label.clone(), message.clone());
                    return Err(CompileError::Structural(message));
                }
            }
        }

        let usages: Vec<Handle<CompilationNode>> = compiler
            .graph
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.kind, NodeKind::LocalVariableUsage { .. }))
            .map(|(h, _)| h)
            .collect();

        for usage in usages {
            let (name, category, label) = match &compiler.graph.nodes[usage].kind {
                NodeKind::LocalVariableUsage { name, category } => (
                    name.clone(),
                    *category,
                    compiler.graph.nodes[usage].label.clone(),
                ),
                _ => continue,
            };

            let Some(&declaration) = declarations.get(&name) else {
                let message = format!("unresolved local variable {name:?}");
                compiler.reporter.error_on_node(label, message.clone());
                return Err(CompileError::Structural(message));
            };

            if let NodeKind::LocalVariableDeclaration {
                category: declared, ..
            } = &compiler.graph.nodes[declaration].kind
            {
                if *declared != category {
                    let message = format!(
                        "local variable {name:?} is {declared} but used as {category}"
                    );
                    compiler.reporter.error_on_node(label, message.clone());
                    return Err(CompileError::Structural(message));
                }
            }

            let Some(source) = compiler.graph.nodes[declaration].inputs[0] else {
                let message = format!("local variable {name:?} has no input");
                let declaration_label = compiler.graph.nodes[declaration].label.clone();
                compiler.reporter.error_on_node(declaration_label, message.clone());
                return Err(CompileError::Structural(message));
            };

            compiler.graph.rewire_consumers(usage, source);
        }
        Ok(())
    }
}
