//! Declaration capabilities of the host schema framework.

use crate::schema::EnumMembers;
use crate::types::{EnumMetadata, FieldDescriptor, TypeHandle, UnionHandle};

/// Registers declarations with the host framework.
///
/// The engine creates handles and passes them in; implementations are trusted to make the
/// declaration visible process-wide. Calls arrive in dependency order: a handle is always
/// declared before fields are attached to it, and nested types before the fields using them.
pub trait SchemaBuilder {
    /// Declare an Object or Input type. Its category is [`TypeHandle::category`].
    fn declare_type(&mut self, handle: &TypeHandle);

    /// Withdraw a type whose fields could not be generated. Fields already attached to it go too.
    fn discard_type(&mut self, _handle: &TypeHandle) {}

    /// Attach a field to a previously declared type.
    fn declare_field(&mut self, owner: &TypeHandle, field: &FieldDescriptor);

    /// Declare an enumeration. Later fields reference `members` by identity.
    fn declare_enum(&mut self, members: &EnumMembers, metadata: &EnumMetadata);

    /// Declare a union of previously declared object types.
    fn declare_union(&mut self, union: &UnionHandle);
}

impl<B: SchemaBuilder + ?Sized> SchemaBuilder for &mut B {
    fn declare_type(&mut self, handle: &TypeHandle) {
        (**self).declare_type(handle)
    }

    fn discard_type(&mut self, handle: &TypeHandle) {
        (**self).discard_type(handle)
    }

    fn declare_field(&mut self, owner: &TypeHandle, field: &FieldDescriptor) {
        (**self).declare_field(owner, field)
    }

    fn declare_enum(&mut self, members: &EnumMembers, metadata: &EnumMetadata) {
        (**self).declare_enum(members, metadata)
    }

    fn declare_union(&mut self, union: &UnionHandle) {
        (**self).declare_union(union)
    }
}
