//! Link Inference Module
//!
//! Builds the owning / inverse links of every relation of the model:
//! one relation per foreign key, or one many-to-many relation per join
//! table.

use crate::error::{RepositoryError, Result};
use crate::models::{
    Cardinality, Entity, ForeignKey, JoinColumn, JoinTable, Link, Optional, Relation, RepositoryModel,
};
use crate::naming::{uncapitalize, unique_name};
use std::collections::HashSet;
use tracing::{debug, info};

pub struct LinkInference;

impl LinkInference {
    /// Replace every link of the model by freshly inferred ones
    ///
    /// Returns the relations in creation order, with their final field names.
    pub fn infer(model: &mut RepositoryModel) -> Result<Vec<Relation>> {
        let removed = model.remove_all_links();
        if removed > 0 {
            debug!("Removed {} existing links", removed);
        }

        let table_names: Vec<String> = model.entity_names().into_iter().map(String::from).collect();
        let mut relations = Vec::new();

        for table_name in &table_names {
            let planned = match model.entity_by_table_name(table_name) {
                Some(entity) if entity.is_join_table() => vec![Self::join_table_relation(model, entity)?],
                Some(entity) => entity
                    .foreign_keys()
                    .filter(|fk| !fk.columns.is_empty())
                    .map(|fk| Self::foreign_key_relation(model, entity, fk))
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };

            for relation in planned {
                relations.push(Self::store_relation(model, relation));
            }
        }

        info!(
            "Link inference done: {} relations, {} links",
            relations.len(),
            model.number_of_links()
        );
        Ok(relations)
    }

    fn referenced_entity<'a>(model: &'a RepositoryModel, entity: &Entity, fk: &ForeignKey) -> Result<&'a Entity> {
        model
            .entity_by_table_name(&fk.referenced_table_name)
            .ok_or_else(|| RepositoryError::ReferencedTableNotFound {
                fk_name: fk.name.clone(),
                table: entity.database_table.clone(),
                referenced_table: fk.referenced_table_name.clone(),
            })
    }

    fn join_columns(entity: &Entity, fk: &ForeignKey) -> Vec<JoinColumn> {
        fk.columns
            .iter()
            .map(|c| {
                let mut join_column = JoinColumn::new(&c.column_name, &c.referenced_column_name);
                if let Some(attr) = entity.attribute_by_column_name(&c.column_name) {
                    join_column.nullable = !attr.database_not_null;
                }
                join_column
            })
            .collect()
    }

    /// ManyToOne / OneToMany pair, or OneToOne pair when the FK columns are
    /// exactly the primary key
    fn foreign_key_relation(model: &RepositoryModel, entity: &Entity, fk: &ForeignKey) -> Result<Relation> {
        let referenced = Self::referenced_entity(model, entity, fk)?;

        let fk_columns: HashSet<&str> = fk.columns.iter().map(|c| c.column_name.as_str()).collect();
        let pk_columns: HashSet<&str> = entity
            .attributes()
            .iter()
            .filter(|a| a.key_element)
            .map(|a| a.database_name.as_str())
            .collect();
        let one_to_one = !pk_columns.is_empty() && fk_columns == pk_columns;

        let owning_id = Link::id_for_foreign_key(&fk.name, true);
        let inverse_id = Link::id_for_foreign_key(&fk.name, false);

        let mut owning = Link::new(
            &owning_id,
            &entity.database_table,
            &referenced.database_table,
            &referenced.class_name,
            if one_to_one { Cardinality::OneToOne } else { Cardinality::ManyToOne },
            true,
        );
        owning.field_name = uncapitalize(&referenced.class_name);
        owning.inverse_side_link_id = Some(inverse_id.clone());
        owning.foreign_key_name = Some(fk.name.clone());
        owning.join_columns = Self::join_columns(entity, fk);
        let mandatory = fk.columns.iter().all(|c| {
            entity
                .attribute_by_column_name(&c.column_name)
                .is_some_and(|a| a.database_not_null)
        });
        owning.optional = if mandatory { Optional::False } else { Optional::True };

        let mut inverse = Link::new(
            &inverse_id,
            &referenced.database_table,
            &entity.database_table,
            &entity.class_name,
            if one_to_one { Cardinality::OneToOne } else { Cardinality::OneToMany },
            false,
        );
        inverse.field_name = if one_to_one {
            uncapitalize(&entity.class_name)
        } else {
            format!("listOf{}", entity.class_name)
        };
        inverse.foreign_key_name = Some(fk.name.clone());

        Ok(Relation::new(owning, inverse))
    }

    /// ManyToMany pair between the two tables referenced by a join table,
    /// owned by the table referenced by the first FK (in name order)
    fn join_table_relation(model: &RepositoryModel, join_entity: &Entity) -> Result<Relation> {
        let fks: Vec<&ForeignKey> = join_entity.foreign_keys().collect();
        let (first_fk, second_fk) = (fks[0], fks[1]);
        let first = Self::referenced_entity(model, join_entity, first_fk)?;
        let second = Self::referenced_entity(model, join_entity, second_fk)?;

        let owning_id = Link::id_for_join_table(&join_entity.database_schema, &join_entity.database_table, true);
        let inverse_id = Link::id_for_join_table(&join_entity.database_schema, &join_entity.database_table, false);

        let join_table = JoinTable {
            name: join_entity.database_table.clone(),
            schema: join_entity.database_schema.clone(),
            catalog: join_entity.database_catalog.clone(),
            join_columns: Self::join_columns(join_entity, first_fk),
            inverse_join_columns: Self::join_columns(join_entity, second_fk),
        };

        let mut owning = Link::new(
            &owning_id,
            &first.database_table,
            &second.database_table,
            &second.class_name,
            Cardinality::ManyToMany,
            true,
        );
        owning.field_name = format!("listOf{}", second.class_name);
        owning.inverse_side_link_id = Some(inverse_id.clone());
        owning.join_table_name = Some(join_entity.database_table.clone());
        owning.join_table = Some(join_table);

        let mut inverse = Link::new(
            &inverse_id,
            &second.database_table,
            &first.database_table,
            &first.class_name,
            Cardinality::ManyToMany,
            false,
        );
        inverse.field_name = format!("listOf{}", first.class_name);
        inverse.join_table_name = Some(join_entity.database_table.clone());

        Ok(Relation::new(owning, inverse))
    }

    /// Give each side a field name unique in its entity, then store it
    fn store_relation(model: &mut RepositoryModel, mut relation: Relation) -> Relation {
        if let Some(owning) = relation.owning.as_mut() {
            Self::store_link(model, owning);
        }
        let mapped_by = relation.owning.as_ref().map(|l| l.field_name.clone());
        if let Some(inverse) = relation.inverse.as_mut() {
            inverse.mapped_by = mapped_by;
            Self::store_link(model, inverse);
        }
        relation
    }

    fn store_link(model: &mut RepositoryModel, link: &mut Link) {
        if let Some(entity) = model.entity_by_table_name_mut(&link.source_table_name) {
            link.field_name = unique_name(&link.field_name, |name| entity.has_field_named(name));
            debug!("{} : {} -> {}", entity.class_name, link.id, link.field_name);
            entity.store_link(link.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attribute, ForeignKeyColumn};
    use pretty_assertions::assert_eq;

    fn column(name: &str, attr_name: &str, position: i32, key: bool, not_null: bool) -> Attribute {
        let mut attr = Attribute::new(name, "INTEGER");
        attr.name = attr_name.to_string();
        attr.database_position = position;
        attr.key_element = key;
        attr.database_not_null = not_null;
        attr
    }

    fn simple_fk(name: &str, table: &str, column: &str, referenced: &str) -> ForeignKey {
        let mut fk = ForeignKey::new(name, table, referenced);
        fk.store_column(ForeignKeyColumn::new(column, "ID", 1));
        fk
    }

    fn school() -> RepositoryModel {
        let mut teacher = Entity::new("TEACHER", "Teacher");
        teacher.store_attribute(column("ID", "id", 1, true, true));

        let mut student = Entity::new("STUDENT", "Student");
        student.store_attribute(column("ID", "id", 1, true, true));
        student.store_attribute(column("TEACHER_ID", "teacherId", 2, false, true));
        student.store_attribute(column("TUTOR_ID", "tutorId", 3, false, false));
        student.store_foreign_key(simple_fk("FK_STUDENT_TEACHER", "STUDENT", "TEACHER_ID", "TEACHER"));
        student.store_foreign_key(simple_fk("FK_STUDENT_TUTOR", "STUDENT", "TUTOR_ID", "TEACHER"));

        let mut course = Entity::new("COURSE", "Course");
        course.store_attribute(column("ID", "id", 1, true, true));

        let mut student_course = Entity::new("STUDENT_COURSE", "StudentCourse");
        student_course.store_attribute(column("STUDENT_ID", "studentId", 1, true, true));
        student_course.store_attribute(column("COURSE_ID", "courseId", 2, true, true));
        student_course.store_foreign_key(simple_fk("FK_SC_STUDENT", "STUDENT_COURSE", "STUDENT_ID", "STUDENT"));
        student_course.store_foreign_key(simple_fk("FK_SC_COURSE", "STUDENT_COURSE", "COURSE_ID", "COURSE"));

        let mut passport = Entity::new("PASSPORT", "Passport");
        passport.store_attribute(column("STUDENT_ID", "studentId", 1, true, true));
        passport.store_foreign_key(simple_fk("FK_PASSPORT_STUDENT", "PASSPORT", "STUDENT_ID", "STUDENT"));

        let mut model = RepositoryModel::new();
        for entity in [teacher, student, course, student_course, passport] {
            model.store_entity(entity);
        }
        model
    }

    #[test]
    fn test_foreign_key_links() {
        let mut model = school();
        LinkInference::infer(&mut model).unwrap();

        let owning = model.link_by_id("LINK_FK_FK_STUDENT_TEACHER_O").unwrap();
        assert_eq!(owning.source_table_name, "STUDENT");
        assert_eq!(owning.cardinality, Cardinality::ManyToOne);
        assert_eq!(owning.field_name, "teacher");
        assert_eq!(owning.optional, Optional::False);
        assert_eq!(owning.inverse_side_link_id.as_deref(), Some("LINK_FK_FK_STUDENT_TEACHER_I"));

        let inverse = model.link_by_id("LINK_FK_FK_STUDENT_TEACHER_I").unwrap();
        assert_eq!(inverse.source_table_name, "TEACHER");
        assert_eq!(inverse.cardinality, Cardinality::OneToMany);
        assert_eq!(inverse.field_name, "listOfStudent");
        assert_eq!(inverse.mapped_by.as_deref(), Some("teacher"));
    }

    #[test]
    fn test_field_names_are_unique_per_entity() {
        let mut model = school();
        LinkInference::infer(&mut model).unwrap();

        let tutor = model.link_by_id("LINK_FK_FK_STUDENT_TUTOR_O").unwrap();
        assert_eq!(tutor.field_name, "teacher2");
        assert_eq!(tutor.optional, Optional::True);
        let tutor_inverse = model.link_by_id("LINK_FK_FK_STUDENT_TUTOR_I").unwrap();
        assert_eq!(tutor_inverse.field_name, "listOfStudent2");
        assert_eq!(tutor_inverse.mapped_by.as_deref(), Some("teacher2"));
    }

    #[test]
    fn test_one_to_one_when_fk_is_primary_key() {
        let mut model = school();
        LinkInference::infer(&mut model).unwrap();

        let owning = model.link_by_id("LINK_FK_FK_PASSPORT_STUDENT_O").unwrap();
        assert_eq!(owning.cardinality, Cardinality::OneToOne);
        let inverse = model.link_by_id("LINK_FK_FK_PASSPORT_STUDENT_I").unwrap();
        assert_eq!(inverse.cardinality, Cardinality::OneToOne);
        assert_eq!(inverse.field_name, "passport");
    }

    #[test]
    fn test_join_table_gives_many_to_many() {
        let mut model = school();
        let relations = LinkInference::infer(&mut model).unwrap();

        // 3 FK relations + 1 join table relation
        assert_eq!(relations.len(), 4);
        assert!(model.link_by_id("LINK_FK_FK_SC_STUDENT_O").is_none());

        // FK_SC_COURSE sorts first: owning side on COURSE
        let owning = model.link_by_id("LINK_JT_STUDENT_COURSE_O").unwrap();
        assert_eq!(owning.source_table_name, "COURSE");
        assert_eq!(owning.cardinality, Cardinality::ManyToMany);
        assert_eq!(owning.field_name, "listOfStudent");
        let join_table = owning.join_table.as_ref().unwrap();
        assert_eq!(join_table.join_columns[0].name, "COURSE_ID");
        assert_eq!(join_table.inverse_join_columns[0].name, "STUDENT_ID");

        let inverse = model.link_by_id("LINK_JT_STUDENT_COURSE_I").unwrap();
        assert_eq!(inverse.source_table_name, "STUDENT");
        assert_eq!(inverse.field_name, "listOfCourse");
        assert_eq!(inverse.mapped_by.as_deref(), Some("listOfStudent"));
    }

    #[test]
    fn test_relations_match_model() {
        let mut model = school();
        LinkInference::infer(&mut model).unwrap();
        let first_run = model.clone();

        let relations = LinkInference::infer(&mut model).unwrap();
        assert_eq!(model, first_run);
        assert_eq!(model.number_of_links(), 8);
        for relation in relations {
            let owning_id = relation.owning.as_ref().unwrap().id.clone();
            assert_eq!(model.relation_by_link_id(&owning_id), Some(relation));
        }
    }

    #[test]
    fn test_dangling_reference_is_fatal() {
        let mut model = school();
        model.remove_entity("TEACHER");
        let err = LinkInference::infer(&mut model).unwrap_err();
        assert!(matches!(err, RepositoryError::ReferencedTableNotFound { .. }));
    }
}
